//! Types for the fetcher module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A progress notification emitted while fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchProgress {
    /// Bytes written to the staging file so far.
    pub transferred_bytes: u64,
    /// Total size of the source, when the source announces it.
    pub total_bytes: Option<u64>,
}

impl FetchProgress {
    pub fn new(transferred_bytes: u64, total_bytes: Option<u64>) -> Self {
        Self {
            transferred_bytes,
            total_bytes,
        }
    }
}

/// Result of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOutcome {
    /// File that now holds the fetched media.
    pub path: PathBuf,
    /// Bytes written.
    pub bytes_written: u64,
}
