//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the job orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Buffer size of the per-stage progress channels.
    /// Events beyond this are dropped by the producers, never blocked on.
    #[serde(default = "default_progress_capacity")]
    pub progress_channel_capacity: usize,
}

fn default_progress_capacity() -> usize {
    64
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            progress_channel_capacity: default_progress_capacity(),
        }
    }
}
