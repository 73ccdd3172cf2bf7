//! Fetcher module for pulling source media into a local staging file.
//!
//! A [`Fetcher`] streams the media behind a source locator into a file and
//! reports transfer progress over an mpsc channel. The remote protocol is
//! left to the backend:
//!
//! - [`HttpFetcher`]: plain HTTP(S) download of a direct media URL.
//! - [`YtDlpFetcher`]: delegates negotiation with video sites to the
//!   `yt-dlp` executable and parses its progress output.

mod config;
mod error;
mod http;
mod traits;
mod types;
mod yt_dlp;

pub use config::{FetcherBackend, FetcherConfig};
pub use error::FetcherError;
pub use http::HttpFetcher;
pub use traits::Fetcher;
pub use types::{FetchOutcome, FetchProgress};
pub use yt_dlp::YtDlpFetcher;

use std::sync::Arc;

/// Builds the fetcher selected by `config.backend`.
pub fn create_fetcher(config: &FetcherConfig) -> Result<Arc<dyn Fetcher>, FetcherError> {
    match config.backend {
        FetcherBackend::Http => Ok(Arc::new(HttpFetcher::new(config.clone())?)),
        FetcherBackend::YtDlp => Ok(Arc::new(YtDlpFetcher::new(config.clone()))),
    }
}
