use crate::{BracketScanner, SeenSet};

pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntakePhase {
    #[default]
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntakeStats {
    /// Candidates produced by the scanner, duplicates included.
    pub candidates: usize,
    pub admitted: usize,
    pub duplicates: usize,
}

/// Producer-side state: scanner position, seen URLs and job numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeState {
    scanner: BracketScanner,
    seen: SeenSet,
    next_job_id: JobId,
    phase: IntakePhase,
    stats: IntakeStats,
}

impl Default for IntakeState {
    fn default() -> Self {
        Self {
            scanner: BracketScanner::new(),
            seen: SeenSet::new(),
            next_job_id: 1,
            phase: IntakePhase::Open,
            stats: IntakeStats::default(),
        }
    }
}

impl IntakeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> IntakePhase {
        self.phase
    }

    pub fn stats(&self) -> IntakeStats {
        self.stats
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    /// True while a bracket group is open and waiting for more input.
    pub fn has_open_group(&self) -> bool {
        self.scanner.is_inside_group()
    }

    /// Scans `chunk` and returns the first-seen candidates with fresh job ids.
    pub(crate) fn ingest(&mut self, chunk: &str) -> Vec<(JobId, String)> {
        let candidates = self.scanner.feed(chunk);
        let mut admitted = Vec::with_capacity(candidates.len());
        for url in candidates {
            self.stats.candidates += 1;
            if self.seen.admit(&url) {
                self.stats.admitted += 1;
                let job_id = self.next_job_id;
                self.next_job_id += 1;
                admitted.push((job_id, url));
            } else {
                self.stats.duplicates += 1;
            }
        }
        admitted
    }

    pub(crate) fn close(&mut self) {
        self.phase = IntakePhase::Closed;
    }
}
