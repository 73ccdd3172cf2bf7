//! Mock transcoder for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use crate::transcoder::{TranscodeProgress, Transcoder, TranscoderError, TrimPlan};

use super::gate::Gate;

/// A recorded transcode for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedTranscode {
    pub input: PathBuf,
    pub output: PathBuf,
    pub plan: TrimPlan,
    /// Whether the transcode succeeded.
    pub success: bool,
}

/// Mock implementation of the Transcoder trait.
///
/// Copies the input to the output unchanged, after replaying any scripted
/// timemarks. Supports error injection and a [`Gate`] like
/// [`MockFetcher`](super::MockFetcher).
#[derive(Debug)]
pub struct MockTranscoder {
    transcodes: Arc<RwLock<Vec<RecordedTranscode>>>,
    timemarks: Arc<RwLock<Vec<String>>>,
    next_error: Arc<RwLock<Option<TranscoderError>>>,
    gate: Arc<RwLock<Option<Arc<Gate>>>>,
}

impl Default for MockTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscoder {
    /// Create a new mock transcoder.
    pub fn new() -> Self {
        Self {
            transcodes: Arc::new(RwLock::new(Vec::new())),
            timemarks: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            gate: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded transcodes.
    pub async fn recorded_transcodes(&self) -> Vec<RecordedTranscode> {
        self.transcodes.read().await.clone()
    }

    /// Get the number of transcodes performed.
    pub async fn transcode_count(&self) -> usize {
        self.transcodes.read().await.len()
    }

    /// Set the timemarks replayed by each transcode.
    pub async fn set_timemarks<I, S>(&self, timemarks: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.timemarks.write().await = timemarks.into_iter().map(Into::into).collect();
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: TranscoderError) {
        *self.next_error.write().await = Some(error);
    }

    /// Hold every transcode at `gate` until it is released.
    pub async fn set_gate(&self, gate: Arc<Gate>) {
        *self.gate.write().await = Some(gate);
    }

    async fn record(&self, input: &Path, output: &Path, plan: &TrimPlan, success: bool) {
        self.transcodes.write().await.push(RecordedTranscode {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            plan: *plan,
            success,
        });
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        plan: &TrimPlan,
        progress_tx: mpsc::Sender<TranscodeProgress>,
    ) -> Result<(), TranscoderError> {
        let timemarks = self.timemarks.read().await.clone();
        for timemark in timemarks {
            let _ = progress_tx.send(TranscodeProgress::new(timemark)).await;
        }

        let gate = self.gate.read().await.clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            self.record(input, output, plan, false).await;
            return Err(err);
        }

        if !input.exists() {
            self.record(input, output, plan, false).await;
            return Err(TranscoderError::InputNotFound {
                path: input.to_path_buf(),
            });
        }

        if let Err(e) = tokio::fs::copy(input, output).await {
            self.record(input, output, plan, false).await;
            return Err(TranscoderError::Io(e));
        }

        self.record(input, output, plan, true).await;
        Ok(())
    }

    async fn validate(&self) -> Result<(), TranscoderError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_transcode_copies_and_records_plan() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in.mp4");
        let output = temp.path().join("out.mp4");
        std::fs::write(&input, b"frames").unwrap();

        let transcoder = MockTranscoder::new();
        transcoder.set_timemarks(["00:00:01.00"]).await;
        let plan = TrimPlan {
            start_seconds: 5,
            duration_seconds: Some(10),
            resize_height: None,
        };

        let (tx, mut rx) = mpsc::channel(8);
        transcoder.transcode(&input, &output, &plan, tx).await.unwrap();

        assert_eq!(std::fs::read(&output).unwrap(), b"frames");
        assert_eq!(rx.recv().await.unwrap().timemark, "00:00:01.00");

        let recorded = transcoder.recorded_transcodes().await;
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].plan, plan);
        assert!(recorded[0].success);
    }

    #[tokio::test]
    async fn test_transcode_error_injection() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in.mp4");
        std::fs::write(&input, b"frames").unwrap();

        let transcoder = MockTranscoder::new();
        transcoder
            .set_next_error(TranscoderError::conversion_failed("boom", None))
            .await;

        let (tx, _rx) = mpsc::channel(8);
        let err = transcoder
            .transcode(&input, &temp.path().join("out.mp4"), &TrimPlan::default(), tx)
            .await
            .unwrap_err();
        assert!(matches!(err, TranscoderError::ConversionFailed { .. }));
        assert!(!transcoder.recorded_transcodes().await[0].success);
    }
}
