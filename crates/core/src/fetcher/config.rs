//! Configuration for the fetcher module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Available fetch backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetcherBackend {
    Http,
    YtDlp,
}

/// Configuration for fetching source media.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Which backend to use.
    #[serde(default = "default_backend")]
    pub backend: FetcherBackend,

    /// User agent sent by the HTTP backend.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// TCP connect timeout for the HTTP backend in seconds.
    /// The transfer itself is never timed out.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Minimum interval between progress updates in milliseconds.
    #[serde(default = "default_progress_interval")]
    pub progress_interval_ms: u64,

    /// Path to the yt-dlp executable.
    #[serde(default = "default_yt_dlp_path")]
    pub yt_dlp_path: PathBuf,

    /// yt-dlp format selector. Must select a single muxed file.
    #[serde(default = "default_yt_dlp_format")]
    pub yt_dlp_format: String,
}

fn default_backend() -> FetcherBackend {
    FetcherBackend::YtDlp
}

fn default_user_agent() -> String {
    format!("reelfetch/{}", env!("CARGO_PKG_VERSION"))
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_progress_interval() -> u64 {
    250
}

fn default_yt_dlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_yt_dlp_format() -> String {
    "best[ext=mp4]/best".to_string()
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout(),
            progress_interval_ms: default_progress_interval(),
            yt_dlp_path: default_yt_dlp_path(),
            yt_dlp_format: default_yt_dlp_format(),
        }
    }
}

impl FetcherConfig {
    /// Creates a config for the given backend with defaults elsewhere.
    pub fn with_backend(backend: FetcherBackend) -> Self {
        Self {
            backend,
            ..Default::default()
        }
    }

    /// Sets the yt-dlp executable path.
    pub fn with_yt_dlp_path(mut self, path: PathBuf) -> Self {
        self.yt_dlp_path = path;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FetcherConfig::default();
        assert_eq!(config.backend, FetcherBackend::YtDlp);
        assert_eq!(config.yt_dlp_path, PathBuf::from("yt-dlp"));
        assert_eq!(config.connect_timeout_secs, 30);
        assert!(config.user_agent.starts_with("reelfetch/"));
    }

    #[test]
    fn test_deserialize_backend() {
        let config: FetcherConfig = toml::from_str(r#"backend = "http""#).unwrap();
        assert_eq!(config.backend, FetcherBackend::Http);

        let config: FetcherConfig = toml::from_str(
            r#"
            backend = "yt_dlp"
            yt_dlp_path = "/opt/bin/yt-dlp"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend, FetcherBackend::YtDlp);
        assert_eq!(config.yt_dlp_path, PathBuf::from("/opt/bin/yt-dlp"));
    }
}
