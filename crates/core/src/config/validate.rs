use std::path::{Component, Path};

use super::{types::Config, ConfigError};
use crate::fetcher::FetcherBackend;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - An ffmpeg path is set
/// - A yt-dlp path is set when the yt-dlp backend is selected
/// - The staging copy buffer and progress channels are non-empty
/// - The staging file name is a single plain path component
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

    // Server validation
    if config.server.port == 0 {
        return invalid("server.port cannot be 0");
    }

    if config.transcoder.ffmpeg_path.as_os_str().is_empty() {
        return invalid("transcoder.ffmpeg_path cannot be empty");
    }

    if config.fetcher.backend == FetcherBackend::YtDlp
        && config.fetcher.yt_dlp_path.as_os_str().is_empty()
    {
        return invalid("fetcher.yt_dlp_path is required for the yt_dlp backend");
    }

    if !is_plain_file_name(&config.staging.file_name) {
        return invalid("staging.file_name must be a plain file name without separators");
    }

    if config.staging.buffer_size == 0 {
        return invalid("staging.buffer_size cannot be 0");
    }

    if config.orchestrator.progress_channel_capacity == 0 {
        return invalid("orchestrator.progress_channel_capacity cannot be 0");
    }

    Ok(())
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}
