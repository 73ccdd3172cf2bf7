//! Process-lifetime cache of fetched artifacts.
//!
//! Maps a source locator to the staging file that already holds the fully
//! fetched, untransformed media. Entries are never evicted, and the cache
//! does not own (or delete) the staging files themselves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// In-memory artifact cache keyed by exact source locator.
#[derive(Debug, Default)]
pub struct ArtifactCache {
    entries: RwLock<HashMap<String, PathBuf>>,
}

impl ArtifactCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the staging path recorded for `source_locator`, if any.
    pub fn lookup(&self, source_locator: &str) -> Option<PathBuf> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(source_locator)
            .cloned()
    }

    /// Records the staging path for `source_locator`. Last writer wins.
    pub fn record(&self, source_locator: impl Into<String>, staging_path: impl AsRef<Path>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(source_locator.into(), staging_path.as_ref().to_path_buf());
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of cached artifacts.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
