//! Job orchestrator for media acquisition.
//!
//! One job at a time moves through:
//! - **Fetch**: skipped when the artifact cache already holds the source
//! - **Transform**: trim/resize via the transcoder, only when requested
//! - **Placement**: verbatim copy when no transform is needed
//!
//! Every transition is published on the [`StatusCell`](crate::status::StatusCell).

mod config;
mod progress;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use progress::render_fetch_progress;
pub use runner::JobOrchestrator;
pub use types::{JobError, JobRequest, Resolution};
