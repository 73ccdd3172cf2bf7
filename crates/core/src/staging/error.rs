//! Error types for the staging module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while allocating staging files or placing output.
#[derive(Debug, Error)]
pub enum StagingError {
    /// The private scratch area could not be created.
    #[error("Failed to allocate staging file under {path}: {source}")]
    AllocationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Staging file to place does not exist.
    #[error("Staging file not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Failed to copy file.
    #[error("Failed to copy {source_path} to {destination}: {error}")]
    CopyFailed {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Checksum verification failed.
    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

impl StagingError {
    /// Creates a copy failed error.
    pub fn copy_failed(source_path: PathBuf, destination: PathBuf, error: std::io::Error) -> Self {
        Self::CopyFailed {
            source_path,
            destination,
            error,
        }
    }

    /// Whether this error happened while allocating, as opposed to placing.
    pub fn is_allocation(&self) -> bool {
        matches!(self, Self::AllocationFailed { .. })
    }
}
