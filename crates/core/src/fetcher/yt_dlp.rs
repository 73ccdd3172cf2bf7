//! yt-dlp subprocess backend.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::debug;

use super::config::FetcherConfig;
use super::error::FetcherError;
use super::traits::Fetcher;
use super::types::{FetchOutcome, FetchProgress};
use crate::tool_output::tail;

/// Marker prefixed to every progress line yt-dlp prints for us.
const PROGRESS_MARKER: &str = "reelfetch-progress";

/// Keep at most this much stderr for error reports.
const STDERR_TAIL_BYTES: usize = 4096;

static PROGRESS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^reelfetch-progress (\d+) (\S+) (\S+)").unwrap());

/// Delegates source negotiation to the `yt-dlp` executable.
pub struct YtDlpFetcher {
    config: FetcherConfig,
}

impl YtDlpFetcher {
    /// Creates a new yt-dlp fetcher.
    pub fn new(config: FetcherConfig) -> Self {
        Self { config }
    }

    /// Builds yt-dlp arguments for fetching into `destination`.
    fn build_args(&self, source_locator: &str, destination: &Path) -> Vec<String> {
        vec![
            "--newline".to_string(),
            "--no-part".to_string(),
            "--no-playlist".to_string(),
            "--force-overwrites".to_string(),
            "-f".to_string(),
            self.config.yt_dlp_format.clone(),
            "-o".to_string(),
            destination.to_string_lossy().to_string(),
            "--progress-template".to_string(),
            format!(
                "download:{} %(progress.downloaded_bytes)s %(progress.total_bytes)s %(progress.total_bytes_estimate)s",
                PROGRESS_MARKER
            ),
            "--".to_string(),
            source_locator.to_string(),
        ]
    }

    /// Parses one stdout line into a progress event.
    ///
    /// yt-dlp prints `NA` for unknown fields; the exact total wins over the
    /// estimate.
    fn parse_progress_line(&self, line: &str) -> Option<FetchProgress> {
        let caps = PROGRESS_REGEX.captures(line.trim())?;
        let transferred_bytes = caps.get(1)?.as_str().parse::<u64>().ok()?;
        let parse_total = |i: usize| {
            caps.get(i)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .filter(|v| *v > 0.0)
                .map(|v| v.round() as u64)
        };
        let total_bytes = parse_total(2).or_else(|| parse_total(3));

        Some(FetchProgress::new(transferred_bytes, total_bytes))
    }
}

#[async_trait]
impl Fetcher for YtDlpFetcher {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn fetch(
        &self,
        source_locator: &str,
        destination: &Path,
        progress_tx: mpsc::Sender<FetchProgress>,
    ) -> Result<FetchOutcome, FetcherError> {
        let args = self.build_args(source_locator, destination);
        debug!("Running {} {:?}", self.config.yt_dlp_path.display(), args);

        let mut child = Command::new(&self.config.yt_dlp_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FetcherError::ToolNotFound {
                        path: self.config.yt_dlp_path.clone(),
                    }
                } else {
                    FetcherError::ToolFailed {
                        reason: format!("failed to start yt-dlp: {}", e),
                        stderr: None,
                    }
                }
            })?;

        let tool_io_failed = |e: std::io::Error| FetcherError::ToolFailed {
            reason: format!("failed to read yt-dlp output: {}", e),
            stderr: None,
        };

        let stdout = child.stdout.take().ok_or_else(|| FetcherError::ToolFailed {
            reason: "yt-dlp stdout was not captured".to_string(),
            stderr: None,
        })?;
        let mut stderr = child.stderr.take().ok_or_else(|| FetcherError::ToolFailed {
            reason: "yt-dlp stderr was not captured".to_string(),
            stderr: None,
        })?;

        let progress_interval = Duration::from_millis(self.config.progress_interval_ms);
        let read_progress = async {
            let mut lines = BufReader::new(stdout).lines();
            let mut last_progress_send: Option<Instant> = None;
            let mut latest = None;

            while let Some(line) = lines.next_line().await? {
                let Some(progress) = self.parse_progress_line(&line) else {
                    continue;
                };
                latest = Some(progress);
                if last_progress_send.is_none_or(|t| t.elapsed() >= progress_interval) {
                    let _ = progress_tx.try_send(progress);
                    last_progress_send = Some(Instant::now());
                }
            }
            Ok::<_, std::io::Error>(latest)
        };
        let read_stderr = async {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf).await?;
            Ok::<_, std::io::Error>(buf)
        };

        let (latest, stderr_bytes) = tokio::try_join!(read_progress, read_stderr)
            .map_err(tool_io_failed)?;
        let status = child.wait().await.map_err(tool_io_failed)?;

        if !status.success() {
            let text = String::from_utf8_lossy(&stderr_bytes);
            let stderr_tail = tail(&text, STDERR_TAIL_BYTES).trim().to_string();
            return Err(FetcherError::ToolFailed {
                reason: format!("yt-dlp exited with code: {:?}", status.code()),
                stderr: (!stderr_tail.is_empty()).then_some(stderr_tail),
            });
        }

        let metadata = tokio::fs::metadata(destination)
            .await
            .map_err(|e| FetcherError::write_failed(destination, e))?;

        let bytes_written = metadata.len();
        let total_bytes = latest.and_then(|p| p.total_bytes).or(Some(bytes_written));
        let _ = progress_tx
            .send(FetchProgress::new(bytes_written, total_bytes))
            .await;

        Ok(FetchOutcome {
            path: destination.to_path_buf(),
            bytes_written,
        })
    }
}
