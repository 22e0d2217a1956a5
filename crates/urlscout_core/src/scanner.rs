use std::sync::LazyLock;

use regex::Regex;

/// Permissive "looks like a URL" token: a scheme or `www.` prefix followed by
/// the longest run of characters that are neither whitespace nor brackets.
static URL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:https?://|www\.)[^\s\[\]]*").expect("valid url token pattern")
});

/// Returns the last URL-like token in `text`, if any.
pub fn last_url_token(text: &str) -> Option<&str> {
    URL_TOKEN.find_iter(text).last().map(|m| m.as_str())
}

/// Incremental bracket-group scanner.
///
/// Only the outermost `[` ... `]` pair delimits a group. Nested brackets are
/// dropped from the group text while their contents are kept, so
/// `[ [a] b ]` is scanned as `" a b "`. A bracket preceded by an unescaped
/// backslash is literal text and never changes the nesting depth.
///
/// State survives between [`BracketScanner::feed`] calls, which lets callers
/// push input as it arrives: a group opened in one chunk and closed in a later
/// one is reported once, when its closing bracket is seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BracketScanner {
    depth: usize,
    buffer: String,
    escape_pending: bool,
}

impl BracketScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-shot scan of a complete text.
    pub fn scan(text: &str) -> Vec<String> {
        let mut scanner = Self::new();
        scanner.feed(text)
    }

    /// Consumes the next chunk of input and returns the candidates of every
    /// group closed inside it, in closing order.
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        let mut candidates = Vec::new();
        for ch in chunk.chars() {
            if let Some(url) = self.step(ch) {
                candidates.push(url);
            }
        }
        candidates
    }

    pub fn is_inside_group(&self) -> bool {
        self.depth > 0
    }

    fn step(&mut self, ch: char) -> Option<String> {
        if self.escape_pending {
            self.escape_pending = false;
            self.push_literal(ch);
            return None;
        }

        match ch {
            '\\' => {
                self.escape_pending = true;
                self.push_literal(ch);
                None
            }
            '[' => {
                self.depth += 1;
                if self.depth == 1 {
                    self.buffer.clear();
                }
                None
            }
            ']' => self.close_bracket(),
            _ => {
                self.push_literal(ch);
                None
            }
        }
    }

    fn close_bracket(&mut self) -> Option<String> {
        if self.depth == 0 {
            return None;
        }
        self.depth -= 1;
        if self.depth > 0 {
            return None;
        }
        let candidate = last_url_token(&self.buffer).map(str::to_owned);
        self.buffer.clear();
        candidate
    }

    fn push_literal(&mut self, ch: char) {
        if self.depth > 0 {
            self.buffer.push(ch);
        }
    }
}
