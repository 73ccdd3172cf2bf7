//! Error types for the fetcher module.

use std::path::PathBuf;
use thiserror::Error;

use crate::tool_output::stderr_suffix;

/// Errors that can occur while fetching source media.
#[derive(Debug, Error)]
pub enum FetcherError {
    /// The remote source could not be reached or the stream broke.
    #[error("Failed to fetch {locator}: {reason}")]
    Source { locator: String, reason: String },

    /// The remote source answered with a non-success HTTP status.
    #[error("Source {locator} answered with HTTP {status}")]
    Status { locator: String, status: u16 },

    /// Writing the staging file failed.
    #[error("Failed to write staging file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external download tool is missing.
    #[error("Fetch tool not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// The external download tool exited unsuccessfully. The last stderr
    /// lines are appended.
    #[error("Fetch tool failed: {reason}{}", stderr_suffix(.stderr))]
    ToolFailed {
        reason: String,
        stderr: Option<String>,
    },
}

impl FetcherError {
    /// Creates a source error.
    pub fn source_failed(locator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Source {
            locator: locator.into(),
            reason: reason.into(),
        }
    }

    /// Creates a staging write error.
    pub fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Whether the failure was on the local sink rather than the source.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FetcherError::source_failed("https://example.com/v.mp4", "connection reset");
        assert_eq!(
            err.to_string(),
            "Failed to fetch https://example.com/v.mp4: connection reset"
        );
        assert!(!err.is_write());

        let err = FetcherError::write_failed(
            "/tmp/x/video.mp4",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        assert!(err.is_write());
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_tool_failed_display_includes_stderr() {
        let err = FetcherError::ToolFailed {
            reason: "yt-dlp exited with code: Some(1)".to_string(),
            stderr: Some("WARNING: retrying\nERROR: [youtube] abc: Video unavailable".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Fetch tool failed: yt-dlp exited with code: Some(1): \
             WARNING: retrying; ERROR: [youtube] abc: Video unavailable"
        );
    }
}
