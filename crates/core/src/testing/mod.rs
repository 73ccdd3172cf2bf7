//! Testing utilities and mock implementations.
//!
//! Mocks for the [`Fetcher`](crate::fetcher::Fetcher) and
//! [`Transcoder`](crate::transcoder::Transcoder) seams, so the orchestrator
//! can be driven end to end without the network, yt-dlp or ffmpeg.
//!
//! # Example
//!
//! ```rust,ignore
//! use reelfetch_core::testing::{Gate, MockFetcher, MockTranscoder};
//!
//! let fetcher = Arc::new(MockFetcher::new());
//! let gate = Gate::new();
//! fetcher.set_gate(Arc::clone(&gate)).await;
//!
//! // Submit a job, then observe it mid-fetch...
//! gate.wait_entered().await;
//! gate.release();
//! ```

mod gate;
mod mock_fetcher;
mod mock_transcoder;

pub use gate::Gate;
pub use mock_fetcher::{MockFetcher, RecordedFetch};
pub use mock_transcoder::{MockTranscoder, RecordedTranscode};
