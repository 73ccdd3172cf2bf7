//! File system staging area.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, BufReader};
use tracing::debug;
use uuid::Uuid;

use super::config::StagingConfig;
use super::error::StagingError;

/// Prefix of every scratch directory created by this process.
const SCRATCH_PREFIX: &str = "reelfetch-";

/// Allocates staging paths and performs verbatim placement.
#[derive(Debug, Clone)]
pub struct StagingArea {
    config: StagingConfig,
}

impl StagingArea {
    /// Creates a staging area with the given configuration.
    pub fn new(config: StagingConfig) -> Self {
        Self { config }
    }

    /// Creates a staging area under the system temp directory.
    pub fn with_defaults() -> Self {
        Self::new(StagingConfig::default())
    }

    pub fn config(&self) -> &StagingConfig {
        &self.config
    }

    /// Allocates a fresh, unique staging file path.
    ///
    /// The enclosing scratch directory is created; the file itself is not.
    pub async fn new_staging_path(&self) -> Result<PathBuf, StagingError> {
        let allocation_failed = |path: &Path, e: std::io::Error| StagingError::AllocationFailed {
            path: path.to_path_buf(),
            source: e,
        };

        fs::create_dir_all(&self.config.scratch_dir)
            .await
            .map_err(|e| allocation_failed(&self.config.scratch_dir, e))?;

        let dir = self
            .config
            .scratch_dir
            .join(format!("{}{}", SCRATCH_PREFIX, Uuid::new_v4().simple()));

        // create_dir: a name collision must fail, never share a directory.
        fs::create_dir(&dir)
            .await
            .map_err(|e| allocation_failed(&dir, e))?;

        let path = dir.join(&self.config.file_name);
        debug!("Allocated staging path {}", path.display());
        Ok(path)
    }

    /// Copies the staged artifact byte-for-byte to `destination`.
    ///
    /// The destination directory must already exist. The staging file is
    /// left in place. Returns the number of bytes copied.
    pub async fn place_verbatim(
        &self,
        staging_path: &Path,
        destination: &Path,
    ) -> Result<u64, StagingError> {
        if !fs::try_exists(staging_path).await.unwrap_or(false) {
            return Err(StagingError::SourceNotFound {
                path: staging_path.to_path_buf(),
            });
        }

        let bytes = fs::copy(staging_path, destination).await.map_err(|e| {
            StagingError::copy_failed(staging_path.to_path_buf(), destination.to_path_buf(), e)
        })?;

        if self.config.verify_copies {
            let expected = self.calculate_checksum(staging_path).await?;
            let actual = self.calculate_checksum(destination).await?;
            if actual != expected {
                return Err(StagingError::ChecksumMismatch {
                    path: destination.to_path_buf(),
                    expected,
                    actual,
                });
            }
        }

        debug!(
            "Placed {} bytes from {} at {}",
            bytes,
            staging_path.display(),
            destination.display()
        );
        Ok(bytes)
    }

    /// Calculates the SHA-256 checksum of a file.
    async fn calculate_checksum(&self, path: &Path) -> Result<String, StagingError> {
        let read_failed =
            |e: std::io::Error| StagingError::copy_failed(path.to_path_buf(), path.to_path_buf(), e);

        let file = File::open(path).await.map_err(read_failed)?;
        let mut reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut buffer = vec![0u8; self.config.buffer_size];
        let mut hasher = Sha256::new();

        loop {
            let bytes_read = reader.read(&mut buffer).await.map_err(read_failed)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(format!("{:x}", hasher.finalize()))
    }
}
