//! A library for converting plain-text and subtitle files to a single text encoding.
//!
//! A run scans one directory, detects each candidate file's encoding, writes converted
//! (and optionally unchanged) files to `<dir>/processed` and can bundle them into a zip archive.
#[cfg(feature = "archive")]
pub mod archive;
pub mod args;
pub mod classify;
pub mod convert;
pub mod detect;
pub mod error;
pub mod progress;
pub mod types;
pub mod utils;

use error::RecodeError;
use progress::ProgressReporter;
use std::io::ErrorKind;
use std::sync::Arc;
use tracing::{info, warn};
use types::*;
use utils::counter::Counter;

/// Validates the source directory and creates the output directory.
pub fn prepare_dirs(options: &RunOptions) -> Result<(), RecodeError> {
    classify::check_source_dir(&options.source_dir)?;
    utils::files::make_sure_dir_exists(&options.output_dir).map_err(|e| {
        if e.kind() == ErrorKind::PermissionDenied {
            RecodeError::access_denied(options.source_dir.clone())
        } else {
            RecodeError::OutputDirectory {
                path: options.output_dir.clone(),
                source: e,
            }
        }
    })
}

/// Runs the whole pipeline: validate, classify, process and optionally compress.
///
/// Per-file failures do not end the run, they are recorded in `counter`.
pub fn run(
    options: &RunOptions,
    progress: Arc<dyn ProgressReporter>,
    counter: Arc<Counter>,
) -> Result<RunReport, RecodeError> {
    prepare_dirs(options)?;
    info!(
        "Scanning {} for files not in {}",
        options.source_dir.display(),
        options.target_encoding.name()
    );
    let entries = classify::list_candidates(&options.source_dir, &counter)?;
    info!("Found {} candidate files", entries.len());
    let processed = convert::process(entries, options, progress, counter);
    let archive = if options.compress {
        compress(options, &processed)?
    } else {
        if options.cleanup_after_compress {
            warn!("--cleanup has no effect without --compress");
        }
        None
    };
    Ok(RunReport { processed, archive })
}

#[cfg(feature = "archive")]
fn compress(
    options: &RunOptions,
    processed: &[ProcessedFile],
) -> Result<Option<std::path::PathBuf>, RecodeError> {
    archive::archive(processed, &options.output_dir, options.cleanup_after_compress).map(Some)
}

#[cfg(not(feature = "archive"))]
fn compress(
    _options: &RunOptions,
    _processed: &[ProcessedFile],
) -> Result<Option<std::path::PathBuf>, RecodeError> {
    warn!("Built without archive support, --compress is ignored");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{FRENCH_TEXT, detect_file};
    use crate::progress::SilentProgress;
    use std::fs;
    use std::path::Path;

    fn scenario() -> (tempfile::TempDir, RunOptions) {
        let dir = tempfile::tempdir().unwrap();
        let (latin1, _, _) = encoding_rs::WINDOWS_1252.encode(FRENCH_TEXT);
        fs::write(dir.path().join("a.srt"), &latin1).unwrap();
        fs::write(dir.path().join("b.txt"), FRENCH_TEXT).unwrap();
        fs::write(dir.path().join("c.jpg"), b"\xFF\xD8\xFF\xE0\xE9\xE8").unwrap();
        let options = RunOptions::new(dir.path(), encoding_rs::UTF_8);
        (dir, options)
    }

    fn run_quiet(options: &RunOptions) -> (Result<RunReport, RecodeError>, Arc<Counter>) {
        let counter = Arc::new(Counter::new());
        let re = run(options, Arc::new(SilentProgress), counter.clone());
        (re, counter)
    }

    fn output_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_default_run() {
        let (_dir, options) = scenario();
        let (re, counter) = run_quiet(&options);
        let report = re.unwrap();
        assert_eq!(report.processed, vec![options.output_dir.join("a.srt")]);
        assert_eq!(output_names(&options.output_dir), vec!["a.srt"]);
        let out = options.output_dir.join("a.srt");
        assert_eq!(fs::read(&out).unwrap(), FRENCH_TEXT.as_bytes());
        assert_eq!(detect_file(&out).unwrap().encoding, encoding_rs::UTF_8);
        assert_eq!(counter.converted(), 1);
        assert_eq!(counter.skipped(), 1);
        assert_eq!(counter.errors(), 0);
    }

    #[test]
    fn test_copy_run() {
        let (dir, mut options) = scenario();
        options.copy_unchanged = true;
        let (re, counter) = run_quiet(&options);
        re.unwrap();
        assert_eq!(output_names(&options.output_dir), vec!["a.srt", "b.txt"]);
        assert_eq!(
            fs::read(options.output_dir.join("b.txt")).unwrap(),
            fs::read(dir.path().join("b.txt")).unwrap()
        );
        assert_eq!(counter.copied(), 1);
    }

    #[test]
    fn test_rerun_is_identical() {
        let (_dir, mut options) = scenario();
        options.copy_unchanged = true;
        options.compress = true;
        run_quiet(&options).0.unwrap();
        let read_all = |dir: &Path| {
            output_names(dir)
                .into_iter()
                .map(|n| fs::read(dir.join(&n)).unwrap())
                .collect::<Vec<_>>()
        };
        let first = read_all(&options.output_dir);
        run_quiet(&options).0.unwrap();
        assert_eq!(read_all(&options.output_dir), first);
    }

    #[cfg(feature = "archive")]
    #[test]
    fn test_compress_and_cleanup() {
        use std::io::Read;
        let (_dir, mut options) = scenario();
        options.copy_unchanged = true;
        options.compress = true;
        options.cleanup_after_compress = true;
        let (re, _) = run_quiet(&options);
        let report = re.unwrap();
        let archive = options.output_dir.join(archive::ARCHIVE_NAME);
        assert_eq!(report.archive.as_deref(), Some(archive.as_path()));
        assert_eq!(output_names(&options.output_dir), vec!["archive.zip"]);
        let mut zip = zip::ZipArchive::new(fs::File::open(&archive).unwrap()).unwrap();
        let mut data = String::new();
        zip.by_name("a.srt")
            .unwrap()
            .read_to_string(&mut data)
            .unwrap();
        assert_eq!(data, FRENCH_TEXT);
        assert!(zip.by_name("b.txt").is_ok());
        assert!(zip.by_name("c.jpg").is_err());
    }

    #[test]
    fn test_invalid_source() {
        let dir = tempfile::tempdir().unwrap();
        let options = RunOptions::new(&dir.path().join("missing"), encoding_rs::UTF_8);
        let (re, _) = run_quiet(&options);
        let err = re.unwrap_err();
        assert!(matches!(err, RecodeError::InvalidSourcePath(_)));
        assert_eq!(err.exit_code(), 1);
        assert!(!options.output_dir.exists());
    }

    #[test]
    fn test_output_dir_is_a_file() {
        let (_dir, options) = scenario();
        fs::write(&options.output_dir, b"not a directory").unwrap();
        let (re, _) = run_quiet(&options);
        assert!(matches!(re, Err(RecodeError::OutputDirectory { .. })));
    }
}
