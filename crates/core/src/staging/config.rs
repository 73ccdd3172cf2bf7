//! Configuration for the staging area.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for staging files and final placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Directory under which per-fetch scratch directories are created.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    /// File name of the fetched artifact inside its scratch directory.
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Buffer size for verbatim copies in bytes.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Whether to verify a SHA-256 checksum after each verbatim copy.
    #[serde(default)]
    pub verify_copies: bool,
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_file_name() -> String {
    "video.mp4".to_string()
}

fn default_buffer_size() -> usize {
    1024 * 1024 // 1 MB
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            scratch_dir: default_scratch_dir(),
            file_name: default_file_name(),
            buffer_size: default_buffer_size(),
            verify_copies: false,
        }
    }
}

impl StagingConfig {
    /// Sets the scratch directory.
    pub fn with_scratch_dir(mut self, scratch_dir: PathBuf) -> Self {
        self.scratch_dir = scratch_dir;
        self
    }

    /// Enables checksum verification of verbatim copies.
    pub fn with_copy_verification(mut self, enabled: bool) -> Self {
        self.verify_copies = enabled;
        self
    }

    /// Sets the buffer size for copies.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StagingConfig::default();
        assert_eq!(config.scratch_dir, std::env::temp_dir());
        assert_eq!(config.file_name, "video.mp4");
        assert_eq!(config.buffer_size, 1024 * 1024);
        assert!(!config.verify_copies);
    }

    #[test]
    fn test_config_builder() {
        let config = StagingConfig::default()
            .with_scratch_dir(PathBuf::from("/var/tmp/reelfetch"))
            .with_copy_verification(true)
            .with_buffer_size(4096);

        assert_eq!(config.scratch_dir, PathBuf::from("/var/tmp/reelfetch"));
        assert!(config.verify_copies);
        assert_eq!(config.buffer_size, 4096);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: StagingConfig = toml::from_str(r#"verify_copies = true"#).unwrap();
        assert!(config.verify_copies);
        assert_eq!(config.file_name, "video.mp4");
    }
}
