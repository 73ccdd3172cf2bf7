//! Staging area for fetched artifacts.
//!
//! Every fresh fetch gets its own private scratch directory
//! (`<scratch_dir>/reelfetch-<uuid>/video.mp4`). When a job needs no
//! trimming or resizing, the staged artifact is copied byte-for-byte to the
//! destination; the staging file itself is kept so the artifact cache can
//! reuse it.

mod area;
mod config;
mod error;

pub use area::StagingArea;
pub use config::StagingConfig;
pub use error::StagingError;
