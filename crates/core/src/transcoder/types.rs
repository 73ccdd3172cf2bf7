//! Types for the transcoder module.

use serde::{Deserialize, Serialize};

use crate::orchestrator::JobRequest;
use crate::timecode::{compute_duration, parse_timecode, TimecodeError};

/// How a staged file is trimmed and resized on its way to the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimPlan {
    /// Seek offset into the input. 0 means from the beginning.
    pub start_seconds: u64,
    /// Output length; `None` runs to the end of the input.
    pub duration_seconds: Option<u64>,
    /// Target frame height; width follows the aspect ratio.
    pub resize_height: Option<u32>,
}

impl TrimPlan {
    /// Builds the plan for a request.
    ///
    /// The duration is only computed when an end bound is given, and an
    /// empty or reversed window is rejected rather than clamped.
    pub fn from_request(request: &JobRequest) -> Result<Self, TimecodeError> {
        let start_seconds = match request.trim_start() {
            Some(start) => parse_timecode(start)?,
            None => 0,
        };

        let duration_seconds = match request.trim_end() {
            Some(_) => Some(compute_duration(request)?),
            None => None,
        };

        Ok(Self {
            start_seconds,
            duration_seconds,
            resize_height: request.target_resolution.height(),
        })
    }
}

/// A progress notification emitted while transcoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscodeProgress {
    /// Position in the output, formatted as `HH:MM:SS.cc`.
    pub timemark: String,
}

impl TranscodeProgress {
    pub fn new(timemark: impl Into<String>) -> Self {
        Self {
            timemark: timemark.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::Resolution;

    fn request(start: Option<&str>, end: Option<&str>, resolution: Resolution) -> JobRequest {
        JobRequest {
            source_locator: "https://example.com/v".to_string(),
            destination_path: "out.mp4".into(),
            trim_start: start.map(str::to_string),
            trim_end: end.map(str::to_string),
            target_resolution: resolution,
        }
    }

    #[test]
    fn test_plan_start_only() {
        let plan =
            TrimPlan::from_request(&request(Some("00:01:00"), None, Resolution::Highest)).unwrap();
        assert_eq!(plan.start_seconds, 60);
        assert_eq!(plan.duration_seconds, None);
        assert_eq!(plan.resize_height, None);
    }

    #[test]
    fn test_plan_full_window_with_resize() {
        let plan = TrimPlan::from_request(&request(
            Some("00:00:10"),
            Some("00:00:25"),
            Resolution::P720,
        ))
        .unwrap();
        assert_eq!(plan.start_seconds, 10);
        assert_eq!(plan.duration_seconds, Some(15));
        assert_eq!(plan.resize_height, Some(720));
    }

    #[test]
    fn test_plan_end_only() {
        let plan = TrimPlan::from_request(&request(None, Some("00:00:30"), Resolution::P360))
            .unwrap();
        assert_eq!(plan.start_seconds, 0);
        assert_eq!(plan.duration_seconds, Some(30));
        assert_eq!(plan.resize_height, Some(360));
    }

    #[test]
    fn test_plan_rejects_reversed_window() {
        let err = TrimPlan::from_request(&request(
            Some("00:01:00"),
            Some("00:00:30"),
            Resolution::Highest,
        ))
        .unwrap_err();
        assert!(matches!(err, TimecodeError::InvalidTrimWindow { .. }));
    }

    #[test]
    fn test_plan_rejects_bad_start() {
        let err = TrimPlan::from_request(&request(Some("soon"), None, Resolution::Highest))
            .unwrap_err();
        assert!(matches!(err, TimecodeError::InvalidTimecode { .. }));
    }
}
