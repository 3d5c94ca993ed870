//! Error types for a backup run.
//!
//! [`BackupError`] aborts the whole run. [`CopyFailure`] describes a single
//! entry that could not be mirrored; the traversal records it and moves on.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Exit status reported for every fatal outcome.
pub const EXIT_FAILURE: u8 = 1;

/// A failure that stops the run.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Source directory does not exist: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("Source is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),

    #[error("Could not create backup directory {}: {source}", .path.display())]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Backup directory is the source directory: {}", .0.display())]
    DestinationIsSource(PathBuf),

    #[error(
        "Source directory {} is inside the backup directory {}",
        .source_dir.display(),
        .backup_dir.display()
    )]
    SourceInsideDestination { source_dir: PathBuf, backup_dir: PathBuf },

    #[error("Could not create directory {}: {source}", .path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not read directory {}: {source}", .path.display())]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid exclude entry '{name}': {source}")]
    InvalidExclude {
        name: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Backup cancelled by user")]
    Cancelled,
}

impl BackupError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        EXIT_FAILURE
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, BackupError::Cancelled)
    }
}

/// What kind of entry a [`CopyFailure`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    File,
    Directory,
}

/// A recoverable, per-entry failure.
#[derive(Debug, Error)]
#[error("Could not {} {}: {source}", .kind.verb(), .path.display())]
pub struct CopyFailure {
    pub path: PathBuf,
    pub kind: FailureKind,
    #[source]
    pub source: io::Error,
}

impl FailureKind {
    fn verb(self) -> &'static str {
        match self {
            FailureKind::File => "copy",
            FailureKind::Directory => "read directory",
        }
    }
}

impl CopyFailure {
    pub fn file(path: PathBuf, source: io::Error) -> Self {
        Self { path, kind: FailureKind::File, source }
    }

    pub fn directory(path: PathBuf, source: io::Error) -> Self {
        Self { path, kind: FailureKind::Directory, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_fatal_error_exits_with_one() {
        let errors = [
            BackupError::SourceMissing(PathBuf::from("/nope")),
            BackupError::Cancelled,
            BackupError::CreateDestination {
                path: PathBuf::from("/root/backup"),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            },
        ];
        for err in &errors {
            assert_eq!(err.exit_code(), 1, "{err}");
        }
        assert!(BackupError::Cancelled.is_cancelled());
    }

    #[test]
    fn copy_failure_names_path_and_cause() {
        let failure = CopyFailure::file(
            PathBuf::from("/src/secret.txt"),
            io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied"),
        );
        assert_eq!(
            failure.to_string(),
            "Could not copy /src/secret.txt: Permission denied"
        );

        let failure = CopyFailure::directory(
            PathBuf::from("/src/locked"),
            io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied"),
        );
        assert!(failure.to_string().starts_with("Could not read directory /src/locked"));
    }
}
