//! Trait definitions for the transcoder module.

use async_trait::async_trait;
use std::path::Path;
use tokio::sync::mpsc;

use super::error::TranscoderError;
use super::types::{TranscodeProgress, TrimPlan};

/// A transcoder that can trim and resize media files.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Returns the name of this transcoder implementation.
    fn name(&self) -> &str;

    /// Writes `input` transformed by `plan` to `output`.
    ///
    /// The progress sender receives timemark updates during the run.
    /// If the receiver is dropped, transcoding continues without progress
    /// reporting.
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        plan: &TrimPlan,
        progress_tx: mpsc::Sender<TranscodeProgress>,
    ) -> Result<(), TranscoderError>;

    /// Validates that the transcoder is properly configured and ready.
    async fn validate(&self) -> Result<(), TranscoderError>;
}
