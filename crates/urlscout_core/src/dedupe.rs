use std::collections::HashSet;

/// Run-scoped set of URLs already handed to the fetch queue.
///
/// Entries are never removed; the set lives as long as the intake state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet {
    seen: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `url` and returns true on first sight, false on every later call.
    pub fn admit(&mut self, url: &str) -> bool {
        // Lookup first so repeats don't allocate.
        if self.seen.contains(url) {
            return false;
        }
        self.seen.insert(url.to_owned())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }
}
