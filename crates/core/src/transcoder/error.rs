//! Error types for the transcoder module.

use std::path::PathBuf;
use thiserror::Error;

use crate::tool_output::stderr_suffix;

/// Errors that can occur during transcoding.
#[derive(Debug, Error)]
pub enum TranscoderError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Transcoding process failed. The last stderr lines are appended.
    #[error("Transcoding failed: {reason}{}", stderr_suffix(.stderr))]
    ConversionFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// I/O error during transcoding.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranscoderError {
    /// Creates a conversion failed error.
    pub fn conversion_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ConversionFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Captured ffmpeg error output, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::ConversionFailed { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }
}
