//! Direct HTTP(S) download backend.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tracing::debug;

use super::config::FetcherConfig;
use super::error::FetcherError;
use super::traits::Fetcher;
use super::types::{FetchOutcome, FetchProgress};

/// Streams a direct media URL into the staging file.
pub struct HttpFetcher {
    client: Client,
    config: FetcherConfig,
}

impl HttpFetcher {
    /// Creates a new HTTP fetcher.
    pub fn new(config: FetcherConfig) -> Result<Self, FetcherError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| FetcherError::source_failed("<client>", e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(
        &self,
        source_locator: &str,
        destination: &Path,
        progress_tx: mpsc::Sender<FetchProgress>,
    ) -> Result<FetchOutcome, FetcherError> {
        let response = self
            .client
            .get(source_locator)
            .send()
            .await
            .map_err(|e| FetcherError::source_failed(source_locator, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetcherError::Status {
                locator: source_locator.to_string(),
                status: status.as_u16(),
            });
        }

        let total_bytes = response.content_length();
        debug!(
            "Fetching {} ({} bytes announced)",
            source_locator,
            total_bytes.map_or_else(|| "unknown".to_string(), |t| t.to_string())
        );

        let file = File::create(destination)
            .await
            .map_err(|e| FetcherError::write_failed(destination, e))?;
        let mut writer = BufWriter::new(file);

        let progress_interval = Duration::from_millis(self.config.progress_interval_ms);
        let mut last_progress_send = Instant::now();
        let mut transferred = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| FetcherError::source_failed(source_locator, e.to_string()))?;

            writer
                .write_all(&chunk)
                .await
                .map_err(|e| FetcherError::write_failed(destination, e))?;
            transferred += chunk.len() as u64;

            if last_progress_send.elapsed() >= progress_interval {
                // Non-blocking send
                let _ = progress_tx.try_send(FetchProgress::new(transferred, total_bytes));
                last_progress_send = Instant::now();
            }
        }

        writer
            .flush()
            .await
            .map_err(|e| FetcherError::write_failed(destination, e))?;

        let _ = progress_tx
            .send(FetchProgress::new(transferred, total_bytes))
            .await;

        Ok(FetchOutcome {
            path: destination.to_path_buf(),
            bytes_written: transferred,
        })
    }
}
