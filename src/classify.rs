//! Discovery of candidate files in the source directory.
use crate::detect::detect_file;
use crate::error::RecodeError;
use crate::types::*;
use crate::utils::counter::Counter;
use crate::utils::files::find_files;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

/// MIME types of files which are converted.
pub const CANDIDATE_TYPES: [&str; 2] = ["text/plain", "application/x-subrip"];

/// MIME type guessed from the file name.
pub fn mime_type<F: AsRef<Path> + ?Sized>(path: &F) -> Option<&'static str> {
    mime_guess::from_path(path).first_raw()
}

pub fn is_candidate<F: AsRef<Path> + ?Sized>(path: &F) -> bool {
    mime_type(path).is_some_and(|t| CANDIDATE_TYPES.contains(&t))
}

/// Checks that `dir` is a directory the current user can read and write.
pub fn check_source_dir(dir: &Path) -> Result<(), RecodeError> {
    let meta = match fs::metadata(dir) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(RecodeError::access_denied(dir.to_path_buf()));
        }
        Err(_) => return Err(RecodeError::InvalidSourcePath(dir.to_path_buf())),
    };
    if !meta.is_dir() {
        return Err(RecodeError::InvalidSourcePath(dir.to_path_buf()));
    }
    if meta.permissions().readonly() {
        return Err(RecodeError::access_denied(dir.to_path_buf()));
    }
    if let Err(e) = fs::read_dir(dir) {
        return Err(if e.kind() == ErrorKind::PermissionDenied {
            RecodeError::access_denied(dir.to_path_buf())
        } else {
            RecodeError::InvalidSourcePath(dir.to_path_buf())
        });
    }
    // Writability for the current user, not just the mode bits.
    if tempfile::tempfile_in(dir).is_err() {
        return Err(RecodeError::access_denied(dir.to_path_buf()));
    }
    Ok(())
}

/// Lists candidate files directly inside `source_dir` and detects their encodings.
///
/// A file whose head cannot be read is logged, counted as an error and left out.
pub fn list_candidates(source_dir: &Path, counter: &Counter) -> Result<Vec<FileEntry>, RecodeError> {
    let files = find_files(source_dir).map_err(|e| {
        if e.kind() == ErrorKind::PermissionDenied {
            RecodeError::access_denied(source_dir.to_path_buf())
        } else {
            RecodeError::InvalidSourcePath(source_dir.to_path_buf())
        }
    })?;
    let mut entries = Vec::new();
    for file in files {
        if !is_candidate(&file) {
            debug!("Ignoring {} ({:?})", file.display(), mime_type(&file));
            continue;
        }
        match detect_file(&file) {
            Ok(detection) => {
                debug!("{} looks like {}", file.display(), detection.encoding.name());
                entries.push(FileEntry::new(file, detection.encoding, detection.bom_len));
            }
            Err(e) => {
                let err = RecodeError::conversion(file, e.into());
                warn!("{}", err);
                counter.inc_error();
            }
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_candidate() {
        assert!(is_candidate("a.txt"));
        assert!(is_candidate("dir/a.TXT"));
        assert!(is_candidate("movie.srt"));
        assert!(!is_candidate("c.jpg"));
        assert!(!is_candidate("archive.zip"));
        assert!(!is_candidate("README"));
    }

    #[test]
    fn test_list_candidates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.srt"), b"1\nhello\n").unwrap();
        fs::write(dir.path().join("b.txt"), b"plain").unwrap();
        fs::write(dir.path().join("c.jpg"), b"\xFF\xD8\xFF\xE0").unwrap();
        fs::create_dir(dir.path().join(OUTPUT_DIR_NAME)).unwrap();
        fs::write(
            dir.path().join(OUTPUT_DIR_NAME).join("old.txt"),
            b"previous run",
        )
        .unwrap();
        let counter = Counter::new();
        let mut names: Vec<_> = list_candidates(dir.path(), &counter)
            .unwrap()
            .iter()
            .map(|e| e.file_name())
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.srt", "b.txt"]);
        assert_eq!(counter.errors(), 0);
    }

    #[test]
    fn test_check_source_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_source_dir(dir.path()).is_ok());
        let missing = dir.path().join("missing");
        assert!(matches!(
            check_source_dir(&missing),
            Err(RecodeError::InvalidSourcePath(_))
        ));
        let file = dir.path().join("file.txt");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            check_source_dir(&file),
            Err(RecodeError::InvalidSourcePath(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_access_denied() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("a.txt"), b"plain").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();
        let re = check_source_dir(&locked);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        let err = re.unwrap_err();
        assert!(matches!(err, RecodeError::AccessDenied { .. }));
        assert_eq!(err.exit_code(), 1);
        // Nothing may be left behind by the write check.
        let names: Vec<_> = fs::read_dir(&locked).unwrap().collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_write_check_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        check_source_dir(dir.path()).unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
