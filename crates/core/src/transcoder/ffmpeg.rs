//! FFmpeg-based transcoder implementation.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::collections::VecDeque;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::debug;

use super::config::TranscoderConfig;
use super::error::TranscoderError;
use super::traits::Transcoder;
use super::types::{TranscodeProgress, TrimPlan};

/// Diagnostic stderr lines kept for error reports.
const STDERR_KEEP_LINES: usize = 16;

static OUT_TIME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^out_time=(\d+:\d{2}:\d{2})(?:\.(\d+))?").unwrap());

/// FFmpeg-based transcoder implementation.
pub struct FfmpegTranscoder {
    config: TranscoderConfig,
}

impl FfmpegTranscoder {
    /// Creates a new FFmpeg transcoder with the given configuration.
    pub fn new(config: TranscoderConfig) -> Self {
        Self { config }
    }

    /// Creates a transcoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TranscoderConfig::default())
    }

    /// Builds ffmpeg arguments for a trim/resize run.
    fn build_args(&self, input: &Path, output: &Path, plan: &TrimPlan) -> Vec<String> {
        let mut args = vec!["-y".to_string()];

        // Input seek
        if plan.start_seconds > 0 {
            args.extend(["-ss".to_string(), plan.start_seconds.to_string()]);
        }

        args.extend(["-i".to_string(), input.to_string_lossy().to_string()]);

        if let Some(duration) = plan.duration_seconds {
            args.extend(["-t".to_string(), duration.to_string()]);
        }

        // Height-constrained, aspect-preserving; -2 keeps the width even.
        if let Some(height) = plan.resize_height {
            args.extend(["-vf".to_string(), format!("scale=-2:{}", height)]);
        }

        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            "-progress".to_string(),
            "pipe:2".to_string(),
            "-nostats".to_string(),
        ]);

        args.extend(self.config.extra_ffmpeg_args.iter().cloned());

        args.push(output.to_string_lossy().to_string());

        args
    }

    /// Extracts a `HH:MM:SS.cc` timemark from an `out_time=` progress line.
    ///
    /// `N/A` and the negative values ffmpeg prints before the first frame
    /// are skipped.
    fn parse_timemark(line: &str) -> Option<String> {
        let caps = OUT_TIME_REGEX.captures(line.trim())?;
        let clock = caps.get(1)?.as_str();
        let fraction = caps.get(2).map_or("", |m| m.as_str());
        let centis: String = fraction.chars().chain("00".chars()).take(2).collect();
        Some(format!("{}.{}", clock, centis))
    }

    /// Whether a stderr line belongs to the `-progress` key=value stream.
    fn is_progress_line(line: &str) -> bool {
        line.split_once('=').is_some_and(|(key, value)| {
            !key.is_empty()
                && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                && !value.contains(' ')
        })
    }

    /// Runs ffmpeg, forwarding progress and collecting error output.
    async fn run_transcode(
        &self,
        input: &Path,
        output: &Path,
        plan: &TrimPlan,
        progress_tx: mpsc::Sender<TranscodeProgress>,
    ) -> Result<(), TranscoderError> {
        if !tokio::fs::try_exists(input).await.unwrap_or(false) {
            return Err(TranscoderError::InputNotFound {
                path: input.to_path_buf(),
            });
        }

        let args = self.build_args(input, output, plan);
        debug!("Running {} {:?}", self.config.ffmpeg_path.display(), args);

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscoderError::FfmpegNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    TranscoderError::Io(e)
                }
            })?;

        let stderr = child.stderr.take().ok_or_else(|| {
            TranscoderError::conversion_failed("ffmpeg stderr was not captured", None)
        })?;
        let mut reader = BufReader::new(stderr).lines();

        let progress_interval = Duration::from_millis(self.config.progress_interval_ms);
        let mut last_progress_send: Option<Instant> = None;
        let mut diagnostics: VecDeque<String> = VecDeque::with_capacity(STDERR_KEEP_LINES);

        while let Some(line) = reader.next_line().await? {
            if !Self::is_progress_line(line.trim()) {
                if diagnostics.len() == STDERR_KEEP_LINES {
                    diagnostics.pop_front();
                }
                diagnostics.push_back(line);
                continue;
            }

            if let Some(timemark) = Self::parse_timemark(&line) {
                if last_progress_send.is_none_or(|t| t.elapsed() >= progress_interval) {
                    // Non-blocking send
                    let _ = progress_tx.try_send(TranscodeProgress::new(timemark));
                    last_progress_send = Some(Instant::now());
                }
            }
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(TranscoderError::conversion_failed(
                format!("FFmpeg exited with code: {:?}", status.code()),
                (!diagnostics.is_empty()).then(|| Vec::from(diagnostics).join("\n")),
            ));
        }

        tokio::fs::metadata(output)
            .await
            .map_err(|_| TranscoderError::conversion_failed("Output file not created", None))?;

        Ok(())
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        plan: &TrimPlan,
        progress_tx: mpsc::Sender<TranscodeProgress>,
    ) -> Result<(), TranscoderError> {
        self.run_transcode(input, output, plan, progress_tx).await
    }

    async fn validate(&self) -> Result<(), TranscoderError> {
        let result = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TranscoderError::FfmpegNotFound {
                    path: self.config.ffmpeg_path.clone(),
                })
            }
            Err(e) => Err(TranscoderError::Io(e)),
        }
    }
}
