pub mod cache;
pub mod config;
pub mod fetcher;
pub mod metrics;
pub mod orchestrator;
pub mod staging;
pub mod status;
pub mod testing;
pub mod timecode;
mod tool_output;
pub mod transcoder;

pub use cache::ArtifactCache;
pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use fetcher::{
    create_fetcher, FetchOutcome, FetchProgress, Fetcher, FetcherBackend, FetcherConfig,
    FetcherError, HttpFetcher, YtDlpFetcher,
};
pub use orchestrator::{
    render_fetch_progress, JobError, JobOrchestrator, JobRequest, OrchestratorConfig, Resolution,
};
pub use staging::{StagingArea, StagingConfig, StagingError};
pub use status::{JobStatus, Stage, StatusCell};
pub use timecode::{compute_duration, parse_timecode, TimecodeError};
pub use transcoder::{
    FfmpegTranscoder, TranscodeProgress, Transcoder, TranscoderConfig, TranscoderError, TrimPlan,
};
