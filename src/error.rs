//! Errors reported by a run.
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RecodeError {
    /// The source directory does not exist or is not a directory.
    #[error("Invalid path: {}", .0.display())]
    InvalidSourcePath(PathBuf),
    /// The source directory cannot be read or written.
    #[error("Access denied for user {user}: {}", .path.display())]
    AccessDenied { path: PathBuf, user: String },
    /// The output directory could not be created.
    #[error("Failed to create output directory {}: {source}", .path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A single file could not be read, decoded, encoded or written.
    #[error("Failed to convert {}: {reason}", .path.display())]
    ConversionFailure { path: PathBuf, reason: String },
    /// The archive could not be written. Processed files are left in place.
    #[error("Failed to write archive {}: {source}", .path.display())]
    ArchiveFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RecodeError {
    pub fn access_denied(path: PathBuf) -> Self {
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| String::from("unknown"));
        RecodeError::AccessDenied { path, user }
    }

    pub fn conversion(path: PathBuf, err: anyhow::Error) -> Self {
        RecodeError::ConversionFailure {
            path,
            reason: format!("{:#}", err),
        }
    }

    /// Whether the error was raised before any file was touched.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            RecodeError::InvalidSourcePath(_)
                | RecodeError::AccessDenied { .. }
                | RecodeError::OutputDirectory { .. }
        )
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        if self.is_preflight() { 1 } else { 2 }
    }
}

#[test]
fn test_exit_code() {
    assert_eq!(RecodeError::InvalidSourcePath(PathBuf::from("x")).exit_code(), 1);
    assert_eq!(RecodeError::access_denied(PathBuf::from("x")).exit_code(), 1);
    let err = RecodeError::ArchiveFailure {
        path: PathBuf::from("archive.zip"),
        source: std::io::Error::other("disk full"),
    };
    assert!(!err.is_preflight());
    assert_eq!(err.exit_code(), 2);
}
