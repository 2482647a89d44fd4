//! Bundling of processed files into a zip archive.
use crate::error::RecodeError;
use crate::types::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// File name of the archive inside the output directory.
pub const ARCHIVE_NAME: &str = "archive.zip";

fn write_archive(processed: &[ProcessedFile], path: &Path) -> zip::result::ZipResult<()> {
    // Fixed timestamps keep reruns byte-identical.
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());
    let mut zip = ZipWriter::new(fs::File::create(path)?);
    for file in processed {
        let name = file
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let data = fs::read(file)?;
        zip.start_file(name, options)?;
        zip.write_all(&data)?;
    }
    zip.finish()?.sync_all()?;
    Ok(())
}

/// Writes every processed file into `<output_dir>/archive.zip`.
///
/// The archive is assembled under a temporary name and renamed into place once complete.
/// When `cleanup` is set the processed files are deleted, but only after that rename.
/// On failure no processed file is touched.
pub fn archive(
    processed: &[ProcessedFile],
    output_dir: &Path,
    cleanup: bool,
) -> Result<PathBuf, RecodeError> {
    let mut files = processed.to_vec();
    files.sort();
    let path = output_dir.join(ARCHIVE_NAME);
    let part = output_dir.join(format!("{}.part", ARCHIVE_NAME));
    info!("Compressing {} files into {}", files.len(), path.display());
    let re = write_archive(&files, &part)
        .map_err(std::io::Error::other)
        .and_then(|_| fs::rename(&part, &path));
    if let Err(source) = re {
        let _ = fs::remove_file(&part);
        return Err(RecodeError::ArchiveFailure { path, source });
    }
    if cleanup {
        for file in files.iter() {
            if let Err(e) = fs::remove_file(file) {
                warn!("Failed to remove {}: {}", file.display(), e);
            }
        }
    }
    Ok(path)
}
