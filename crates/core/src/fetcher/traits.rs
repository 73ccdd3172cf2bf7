//! Trait definitions for the fetcher module.

use async_trait::async_trait;
use std::path::Path;
use tokio::sync::mpsc;

use super::error::FetcherError;
use super::types::{FetchOutcome, FetchProgress};

/// Something that can pull the media behind a source locator into a file.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Streams `source_locator` into `destination`.
    ///
    /// Progress is reported on `progress_tx`; the sender is dropped when the
    /// fetch returns. If the receiver is gone the fetch continues without
    /// progress reporting.
    async fn fetch(
        &self,
        source_locator: &str,
        destination: &Path,
        progress_tx: mpsc::Sender<FetchProgress>,
    ) -> Result<FetchOutcome, FetcherError>;
}
