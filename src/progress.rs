//! Progress reporting for the conversion stage.
//!
//! The reporter is handed to [crate::convert::process] and shared between the
//! worker threads, so implementations must be `Send + Sync`.
use crate::types::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};

pub trait ProgressReporter: Send + Sync {
    /// Called once before the first entry with the number of entries.
    fn start(&self, total: u64);

    /// Called exactly once per entry, whatever its outcome.
    fn advance(&self, entry: &FileEntry, outcome: &Outcome);

    /// Called once after the last entry.
    fn finish(&self);
}

/// Reports nothing.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn start(&self, _total: u64) {}

    fn advance(&self, _entry: &FileEntry, _outcome: &Outcome) {}

    fn finish(&self) {}
}

/// Progress bar on stderr, with one line per written or failed file printed above it.
pub struct CliProgress {
    bar: ProgressBar,
    written: AtomicU64,
}

impl CliProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        CliProgress {
            bar,
            written: AtomicU64::new(0),
        }
    }

    /// Line for the next entry. Only written files take a number.
    fn next_line(&self, entry: &FileEntry, outcome: &Outcome) -> Option<String> {
        let n = if outcome.processed().is_some() {
            self.written.fetch_add(1, Ordering::SeqCst) + 1
        } else {
            0
        };
        describe(n, entry, outcome)
    }
}

impl Default for CliProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// The line printed for an entry, `None` for a skipped one.
pub fn describe(n: u64, entry: &FileEntry, outcome: &Outcome) -> Option<String> {
    let name = entry.file_name();
    match outcome {
        Outcome::Converted { from, to, .. } => Some(format!(
            "{}\t {} -> {} \t {}",
            n,
            from.name(),
            to.name(),
            name
        )),
        Outcome::Copied { .. } => Some(format!("{}\t copy \t\t\t {}", n, name)),
        Outcome::Failed(_) => Some(format!("-\t failed \t\t {}", name)),
        Outcome::Skipped => None,
    }
}

impl ProgressReporter for CliProgress {
    fn start(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
    }

    fn advance(&self, entry: &FileEntry, outcome: &Outcome) {
        if let Some(line) = self.next_line(entry, outcome) {
            self.bar.println(line);
        }
        self.bar.set_message(entry.file_name());
        self.bar.inc(1);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[test]
fn test_describe() {
    let entry = FileEntry::new("dir/a.srt".into(), encoding_rs::WINDOWS_1252, 0);
    let converted = Outcome::Converted {
        from: encoding_rs::WINDOWS_1252,
        to: encoding_rs::UTF_8,
        dest: "dir/processed/a.srt".into(),
    };
    assert_eq!(
        describe(1, &entry, &converted).unwrap(),
        "1\t windows-1252 -> UTF-8 \t a.srt"
    );
    let copied = Outcome::Copied {
        dest: "dir/processed/a.srt".into(),
    };
    assert_eq!(describe(2, &entry, &copied).unwrap(), "2\t copy \t\t\t a.srt");
    assert!(describe(0, &entry, &Outcome::Skipped).is_none());
}

#[test]
fn test_cli_progress_numbering() {
    let progress = CliProgress::new();
    progress.bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    progress.start(4);
    let copied = FileEntry::new("dir/b.txt".into(), encoding_rs::UTF_8, 0);
    let skipped = FileEntry::new("dir/c.txt".into(), encoding_rs::UTF_8, 0);
    let converted = FileEntry::new("dir/a.srt".into(), encoding_rs::WINDOWS_1252, 0);
    let copy = Outcome::Copied {
        dest: "dir/processed/b.txt".into(),
    };
    assert_eq!(
        progress.next_line(&copied, &copy).unwrap(),
        "1\t copy \t\t\t b.txt"
    );
    assert!(progress.next_line(&skipped, &Outcome::Skipped).is_none());
    let convert = Outcome::Converted {
        from: encoding_rs::WINDOWS_1252,
        to: encoding_rs::UTF_8,
        dest: "dir/processed/a.srt".into(),
    };
    assert_eq!(
        progress.next_line(&converted, &convert).unwrap(),
        "2\t windows-1252 -> UTF-8 \t a.srt"
    );
    progress.advance(&skipped, &Outcome::Skipped);
    progress.advance(&converted, &convert);
    assert_eq!(progress.bar.position(), 2);
    assert_eq!(progress.written.load(Ordering::SeqCst), 3);
    progress.finish();
}
