//! A simple counter for tracking per-file results of a run.
use crate::types::*;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::SeqCst;

/// A counter for tracking per-file results of a run.
#[derive(Default)]
pub struct Counter {
    converted: AtomicUsize,
    copied: AtomicUsize,
    skipped: AtomicUsize,
    error: AtomicUsize,
    warning: AtomicUsize,
}

impl Counter {
    /// Creates a new Counter instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the count of errors.
    pub fn inc_error(&self) {
        self.error.fetch_add(1, SeqCst);
    }

    /// Increments the count of warnings.
    pub fn inc_warning(&self) {
        self.warning.fetch_add(1, SeqCst);
    }

    /// Records the outcome of one entry.
    pub fn inc(&self, outcome: &Outcome) {
        match outcome {
            Outcome::Converted { .. } => {
                self.converted.fetch_add(1, SeqCst);
            }
            Outcome::Copied { .. } => {
                self.copied.fetch_add(1, SeqCst);
            }
            Outcome::Skipped => {
                self.skipped.fetch_add(1, SeqCst);
            }
            Outcome::Failed(_) => self.inc_error(),
        }
    }

    pub fn converted(&self) -> usize {
        self.converted.load(SeqCst)
    }

    pub fn copied(&self) -> usize {
        self.copied.load(SeqCst)
    }

    pub fn skipped(&self) -> usize {
        self.skipped.load(SeqCst)
    }

    pub fn errors(&self) -> usize {
        self.error.load(SeqCst)
    }

    pub fn warnings(&self) -> usize {
        self.warning.load(SeqCst)
    }
}

impl std::fmt::Display for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Converted: {}, Copied: {}, Skipped: {}, Error: {}, Warning: {}",
            self.converted(),
            self.copied(),
            self.skipped(),
            self.errors(),
            self.warnings(),
        )
    }
}

#[test]
fn test_counter_display() {
    let counter = Counter::new();
    counter.inc(&Outcome::Skipped);
    counter.inc(&Outcome::Copied {
        dest: ProcessedFile::from("b.txt"),
    });
    counter.inc(&Outcome::Failed(crate::error::RecodeError::ConversionFailure {
        path: "c.txt".into(),
        reason: String::from("bad bytes"),
    }));
    counter.inc_warning();
    assert_eq!(
        counter.to_string(),
        "Converted: 0, Copied: 1, Skipped: 1, Error: 1, Warning: 1"
    );
}
