//! Mock fetcher for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use crate::fetcher::{FetchOutcome, FetchProgress, Fetcher, FetcherError};

use super::gate::Gate;

/// A recorded fetch for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedFetch {
    /// The locator that was requested.
    pub source_locator: String,
    /// The staging file it was written to.
    pub destination: PathBuf,
    /// Whether the fetch succeeded.
    pub success: bool,
}

/// Mock implementation of the Fetcher trait.
///
/// Provides controllable behavior for testing:
/// - Track fetches for assertions
/// - Write a fixed payload to the staging file
/// - Replay scripted progress events
/// - Simulate failure
/// - Hold a fetch open behind a [`Gate`]
///
/// # Example
///
/// ```rust,ignore
/// use reelfetch_core::testing::MockFetcher;
///
/// let fetcher = MockFetcher::new();
/// fetcher.set_progress(vec![FetchProgress::new(1_048_576, Some(2_097_152))]).await;
///
/// // Run a job...
///
/// assert_eq!(fetcher.fetch_count().await, 1);
/// ```
#[derive(Debug)]
pub struct MockFetcher {
    /// Recorded fetches.
    fetches: Arc<RwLock<Vec<RecordedFetch>>>,
    /// Bytes written to the destination on success.
    payload: Arc<RwLock<Vec<u8>>>,
    /// Progress events sent before the payload is written.
    progress: Arc<RwLock<Vec<FetchProgress>>>,
    /// If set, the next fetch will fail with this error.
    next_error: Arc<RwLock<Option<FetcherError>>>,
    /// If set, fetches block here after reporting progress.
    gate: Arc<RwLock<Option<Arc<Gate>>>>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    /// Create a new mock fetcher.
    pub fn new() -> Self {
        Self {
            fetches: Arc::new(RwLock::new(Vec::new())),
            payload: Arc::new(RwLock::new(b"mock video payload".to_vec())),
            progress: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            gate: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded fetches.
    pub async fn recorded_fetches(&self) -> Vec<RecordedFetch> {
        self.fetches.read().await.clone()
    }

    /// Get the number of fetches performed.
    pub async fn fetch_count(&self) -> usize {
        self.fetches.read().await.len()
    }

    /// Set the bytes written by successful fetches.
    pub async fn set_payload(&self, payload: impl Into<Vec<u8>>) {
        *self.payload.write().await = payload.into();
    }

    /// Set the progress events replayed by each fetch.
    pub async fn set_progress(&self, events: Vec<FetchProgress>) {
        *self.progress.write().await = events;
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn set_next_error(&self, error: FetcherError) {
        *self.next_error.write().await = Some(error);
    }

    /// Hold every fetch at `gate` until it is released.
    pub async fn set_gate(&self, gate: Arc<Gate>) {
        *self.gate.write().await = Some(gate);
    }

    /// Let fetches run straight through again.
    pub async fn clear_gate(&self) {
        *self.gate.write().await = None;
    }

    async fn record(&self, source_locator: &str, destination: &Path, success: bool) {
        self.fetches.write().await.push(RecordedFetch {
            source_locator: source_locator.to_string(),
            destination: destination.to_path_buf(),
            success,
        });
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(
        &self,
        source_locator: &str,
        destination: &Path,
        progress_tx: mpsc::Sender<FetchProgress>,
    ) -> Result<FetchOutcome, FetcherError> {
        let events = self.progress.read().await.clone();
        for event in events {
            let _ = progress_tx.send(event).await;
        }

        let gate = self.gate.read().await.clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            self.record(source_locator, destination, false).await;
            return Err(err);
        }

        let payload = self.payload.read().await.clone();
        if let Err(e) = tokio::fs::write(destination, &payload).await {
            self.record(source_locator, destination, false).await;
            return Err(FetcherError::write_failed(destination, e));
        }

        self.record(source_locator, destination, true).await;
        Ok(FetchOutcome {
            path: destination.to_path_buf(),
            bytes_written: payload.len() as u64,
        })
    }
}
