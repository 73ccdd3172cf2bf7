//! The observable job status slot.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Status of the current (or last) job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "payload", rename_all = "snake_case")]
pub enum JobStatus {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// Fetching the source. Payload is transfer progress text.
    Downloading(String),
    /// Trimming/resizing. Payload is the transcoder timemark.
    Processing(String),
    /// The destination file is in place.
    Completed,
    /// The run failed. Payload is the error message.
    Error(String),
}

impl JobStatus {
    /// Whether a run is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Downloading(_) | Self::Processing(_))
    }

    /// Whether this is `Completed` or `Error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error(_))
    }

    /// Short lowercase name of the status kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Downloading(_) => "downloading",
            Self::Processing(_) => "processing",
            Self::Completed => "completed",
            Self::Error(_) => "error",
        }
    }

    /// Progress text or error message; empty for payload-less states.
    pub fn payload(&self) -> &str {
        match self {
            Self::Downloading(p) | Self::Processing(p) | Self::Error(p) => p,
            Self::Idle | Self::Completed => "",
        }
    }
}

/// The in-flight stage a progress update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Downloading,
    Processing,
}

/// Single-slot, last-write-wins status holder.
///
/// Observers take a [`watch::Receiver`] through [`StatusCell::subscribe`]
/// and drop it to unsubscribe. Slow observers skip intermediate values and
/// see the latest one.
#[derive(Debug)]
pub struct StatusCell {
    tx: watch::Sender<JobStatus>,
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusCell {
    /// Creates a cell holding [`JobStatus::Idle`].
    pub fn new() -> Self {
        let (tx, _) = watch::channel(JobStatus::Idle);
        Self { tx }
    }

    /// Returns the current status.
    pub fn get(&self) -> JobStatus {
        self.tx.borrow().clone()
    }

    /// Replaces the status and notifies observers.
    pub fn set(&self, status: JobStatus) {
        self.tx.send_replace(status);
    }

    /// Subscribes to status changes.
    pub fn subscribe(&self) -> watch::Receiver<JobStatus> {
        self.tx.subscribe()
    }

    /// Atomically moves an accepting cell to `Downloading("")`.
    ///
    /// Returns `false` and leaves the cell untouched while a run is in
    /// flight.
    pub fn try_admit(&self) -> bool {
        self.tx.send_if_modified(|status| {
            if status.is_busy() {
                false
            } else {
                *status = JobStatus::Downloading(String::new());
                true
            }
        })
    }

    /// Updates the progress payload, but only while the cell is still in
    /// `stage`. Returns whether the write happened.
    pub fn set_progress(&self, stage: Stage, payload: String) -> bool {
        self.tx.send_if_modified(|status| {
            let same_stage = matches!(
                (stage, &*status),
                (Stage::Downloading, JobStatus::Downloading(_))
                    | (Stage::Processing, JobStatus::Processing(_))
            );
            if !same_stage || status.payload() == payload {
                return false;
            }
            *status = match stage {
                Stage::Downloading => JobStatus::Downloading(payload),
                Stage::Processing => JobStatus::Processing(payload),
            };
            true
        })
    }
}
