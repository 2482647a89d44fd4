use crate::error::RecodeError;
use encoding_rs::Encoding;
use std::path::{Path, PathBuf};

/// Name of the output directory created inside the source directory.
pub const OUTPUT_DIR_NAME: &str = "processed";

#[derive(Clone, Debug)]
/// A candidate file together with its detected encoding.
pub struct FileEntry {
    pub source_path: PathBuf,
    pub detected_encoding: &'static Encoding,
    /// Length of the byte order mark at the start of the file, 0 if none.
    pub bom_len: usize,
}

impl FileEntry {
    pub fn new(source_path: PathBuf, detected_encoding: &'static Encoding, bom_len: usize) -> Self {
        FileEntry {
            source_path,
            detected_encoding,
            bom_len,
        }
    }

    /// Base file name used for the output file and the archive entry.
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Path of a file written into the output directory.
pub type ProcessedFile = PathBuf;

#[derive(Clone, Debug)]
/// Options for a single run
pub struct RunOptions {
    /// Directory to scan
    pub source_dir: PathBuf,
    /// Always `<source_dir>/processed`
    pub output_dir: PathBuf,
    pub target_encoding: &'static Encoding,
    /// Copy files already in the target encoding
    pub copy_unchanged: bool,
    pub compress: bool,
    /// Delete archived files after the archive is written
    pub cleanup_after_compress: bool,
    /// Accept replacement of characters the target encoding cannot represent
    pub lossy: bool,
    /// Number of conversion workers
    pub jobs: usize,
}

impl RunOptions {
    pub fn new<P: AsRef<Path> + ?Sized>(source_dir: &P, target_encoding: &'static Encoding) -> Self {
        let source_dir = source_dir.as_ref().to_path_buf();
        let output_dir = source_dir.join(OUTPUT_DIR_NAME);
        RunOptions {
            source_dir,
            output_dir,
            target_encoding,
            copy_unchanged: false,
            compress: false,
            cleanup_after_compress: false,
            lossy: false,
            jobs: num_cpus::get().max(1),
        }
    }
}

#[derive(Debug)]
/// Result of processing one entry
pub enum Outcome {
    Converted {
        from: &'static Encoding,
        to: &'static Encoding,
        dest: ProcessedFile,
    },
    Copied {
        dest: ProcessedFile,
    },
    /// Already in the target encoding and copying was not requested
    Skipped,
    Failed(RecodeError),
}

impl Outcome {
    /// The written file, if any.
    pub fn processed(&self) -> Option<&Path> {
        match self {
            Outcome::Converted { dest, .. } | Outcome::Copied { dest } => Some(dest),
            Outcome::Skipped | Outcome::Failed(_) => None,
        }
    }

    pub fn into_processed(self) -> Option<ProcessedFile> {
        match self {
            Outcome::Converted { dest, .. } | Outcome::Copied { dest } => Some(dest),
            Outcome::Skipped | Outcome::Failed(_) => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    /// Files written into the output directory, sorted by name
    pub processed: Vec<ProcessedFile>,
    pub archive: Option<PathBuf>,
}
