//! Transcoder module for trimming and resizing fetched media.
//!
//! The [`Transcoder`] trait takes a staged input file, a [`TrimPlan`] and
//! a destination, and reports progress as ffmpeg-style timemarks.
//! [`FfmpegTranscoder`] drives the `ffmpeg` executable.

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::TranscoderConfig;
pub use error::TranscoderError;
pub use ffmpeg::FfmpegTranscoder;
pub use traits::Transcoder;
pub use types::{TranscodeProgress, TrimPlan};
