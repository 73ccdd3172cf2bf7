//! `HH:MM:SS` timecode arithmetic for trim windows.

use thiserror::Error;

use crate::orchestrator::JobRequest;

/// Errors produced while interpreting trim timecodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimecodeError {
    /// The text is not a `[[HH:]MM:]SS` timecode.
    #[error("invalid timecode '{text}': expected up to three numeric HH:MM:SS components")]
    InvalidTimecode { text: String },

    /// The trim window is empty or reversed.
    #[error("invalid trim window: end time {end} must be after start time {start}")]
    InvalidTrimWindow { start: String, end: String },
}

/// Parses a timecode into whole seconds.
///
/// Components are read right-to-left as seconds, minutes and hours. Missing
/// or empty components count as zero, so `""` is 0 and `"90"` is 90
/// seconds. Component magnitude is not bounded: `"99:00"` is 99 minutes.
pub fn parse_timecode(text: &str) -> Result<u64, TimecodeError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }

    let components: Vec<&str> = text.split(':').collect();
    if components.len() > 3 {
        return Err(TimecodeError::InvalidTimecode {
            text: text.to_string(),
        });
    }

    let invalid = || TimecodeError::InvalidTimecode {
        text: text.to_string(),
    };

    let mut seconds = 0u64;
    for (component, unit) in components.iter().rev().zip([1u64, 60, 3600]) {
        let value = if component.is_empty() {
            0
        } else {
            component.parse::<u64>().map_err(|_| invalid())?
        };
        // Values too large for u64 seconds are rejected, not wrapped.
        seconds = value
            .checked_mul(unit)
            .and_then(|v| seconds.checked_add(v))
            .ok_or_else(invalid)?;
    }

    Ok(seconds)
}

/// Computes the length of the request's trim window in seconds.
///
/// A missing start counts as the beginning of the media. Fails with
/// [`TimecodeError::InvalidTrimWindow`] when the end is not strictly after
/// the start.
pub fn compute_duration(request: &JobRequest) -> Result<u64, TimecodeError> {
    let start_text = request.trim_start().unwrap_or("");
    let end_text = request.trim_end().unwrap_or("");

    let start = parse_timecode(start_text)?;
    let end = parse_timecode(end_text)?;

    if end <= start {
        return Err(TimecodeError::InvalidTrimWindow {
            start: start_text.to_string(),
            end: end_text.to_string(),
        });
    }

    Ok(end - start)
}
