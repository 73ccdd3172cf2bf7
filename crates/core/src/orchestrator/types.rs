//! Types for the job orchestrator.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::fetcher::FetcherError;
use crate::staging::StagingError;
use crate::timecode::TimecodeError;
use crate::transcoder::TranscoderError;

/// Output frame height requested for a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Keep the source resolution.
    #[default]
    #[serde(rename = "highest")]
    Highest,
    #[serde(rename = "720")]
    P720,
    #[serde(rename = "360")]
    P360,
}

impl Resolution {
    /// Target frame height, or `None` for the source resolution.
    pub fn height(&self) -> Option<u32> {
        match self {
            Self::Highest => None,
            Self::P720 => Some(720),
            Self::P360 => Some(360),
        }
    }
}

/// One acquisition request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    /// Where to fetch the media from. Also the cache key.
    pub source_locator: String,
    /// Where the final file is written.
    pub destination_path: PathBuf,
    /// Trim start as `HH:MM:SS`.
    #[serde(default)]
    pub trim_start: Option<String>,
    /// Trim end as `HH:MM:SS`.
    #[serde(default)]
    pub trim_end: Option<String>,
    #[serde(default)]
    pub target_resolution: Resolution,
}

impl JobRequest {
    /// Creates a plain request: no trim, source resolution.
    pub fn new(source_locator: impl Into<String>, destination_path: impl Into<PathBuf>) -> Self {
        Self {
            source_locator: source_locator.into(),
            destination_path: destination_path.into(),
            trim_start: None,
            trim_end: None,
            target_resolution: Resolution::Highest,
        }
    }

    pub fn with_trim_start(mut self, start: impl Into<String>) -> Self {
        self.trim_start = Some(start.into());
        self
    }

    pub fn with_trim_end(mut self, end: impl Into<String>) -> Self {
        self.trim_end = Some(end.into());
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.target_resolution = resolution;
        self
    }

    /// Trim start, with an empty string treated as absent.
    pub fn trim_start(&self) -> Option<&str> {
        self.trim_start.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Trim end, with an empty string treated as absent.
    pub fn trim_end(&self) -> Option<&str> {
        self.trim_end.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Whether the staged file must go through the transcoder.
    pub fn requires_transform(&self) -> bool {
        self.trim_start().is_some()
            || self.trim_end().is_some()
            || self.target_resolution != Resolution::Highest
    }
}

/// Reasons a job run ends in `Error`.
#[derive(Debug, Error)]
pub enum JobError {
    /// No staging file could be allocated.
    #[error("failed to allocate staging file: {0}")]
    StagingAllocation(#[source] StagingError),

    /// The source could not be fetched.
    #[error("{0}")]
    Fetch(#[source] FetcherError),

    /// The fetched bytes could not be written to the staging file.
    #[error("{0}")]
    Write(#[source] FetcherError),

    /// A trim timecode is malformed, or the trim window is empty/reversed.
    #[error(transparent)]
    Timecode(#[from] TimecodeError),

    /// The transcoder failed.
    #[error("{0}")]
    Transform(#[from] TranscoderError),

    /// Copying the staged file to its destination failed.
    #[error("failed to place file: {0}")]
    Placement(#[source] StagingError),

    /// A panic or other unexpected failure inside the run.
    #[error("internal error: {0}")]
    Internal(String),
}

impl JobError {
    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StagingAllocation(_) => "staging_allocation",
            Self::Fetch(_) => "fetch",
            Self::Write(_) => "write",
            Self::Timecode(TimecodeError::InvalidTimecode { .. }) => "invalid_timecode",
            Self::Timecode(TimecodeError::InvalidTrimWindow { .. }) => "invalid_trim_window",
            Self::Transform(_) => "transform",
            Self::Placement(_) => "placement",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<FetcherError> for JobError {
    fn from(err: FetcherError) -> Self {
        if err.is_write() {
            Self::Write(err)
        } else {
            Self::Fetch(err)
        }
    }
}

impl From<StagingError> for JobError {
    fn from(err: StagingError) -> Self {
        if err.is_allocation() {
            Self::StagingAllocation(err)
        } else {
            Self::Placement(err)
        }
    }
}
