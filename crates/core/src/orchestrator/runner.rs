//! Job orchestrator implementation.
//!
//! Drives one job at a time through fetch, an optional transform and
//! placement, publishing every transition on the status cell.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::cache::ArtifactCache;
use crate::fetcher::{FetchProgress, Fetcher};
use crate::metrics;
use crate::staging::StagingArea;
use crate::status::{JobStatus, Stage, StatusCell};
use crate::transcoder::{TranscodeProgress, Transcoder, TrimPlan};

use super::config::OrchestratorConfig;
use super::progress::{render_fetch_progress, ProgressListener};
use super::types::{JobError, JobRequest};

/// The job orchestrator: single-flight admission plus the run state machine.
pub struct JobOrchestrator {
    config: OrchestratorConfig,
    fetcher: Arc<dyn Fetcher>,
    transcoder: Arc<dyn Transcoder>,
    staging: StagingArea,
    cache: Arc<ArtifactCache>,
    status: Arc<StatusCell>,
}

impl JobOrchestrator {
    /// Create a new orchestrator with an empty cache and an idle status cell.
    pub fn new(
        config: OrchestratorConfig,
        fetcher: Arc<dyn Fetcher>,
        transcoder: Arc<dyn Transcoder>,
        staging: StagingArea,
    ) -> Self {
        Self {
            config,
            fetcher,
            transcoder,
            staging,
            cache: Arc::new(ArtifactCache::new()),
            status: Arc::new(StatusCell::new()),
        }
    }

    /// Use a shared artifact cache.
    pub fn with_cache(mut self, cache: Arc<ArtifactCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Use a shared status cell.
    pub fn with_status_cell(mut self, status: Arc<StatusCell>) -> Self {
        self.status = status;
        self
    }

    /// Submits a job and returns immediately.
    ///
    /// Returns `false` when a job is already in flight; the request is
    /// dropped and the status is left untouched. Failures of an admitted
    /// job only ever surface as [`JobStatus::Error`].
    pub fn submit(self: &Arc<Self>, request: JobRequest) -> bool {
        if !self.admit(&request) {
            return false;
        }

        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.drive(request).await;
        });
        true
    }

    /// Runs a job to its terminal status in the caller's task.
    ///
    /// A rejected submission returns the unchanged current status.
    pub async fn run(&self, request: JobRequest) -> JobStatus {
        if self.admit(&request) {
            self.drive(request).await;
        }
        self.current_status()
    }

    pub fn current_status(&self) -> JobStatus {
        self.status.get()
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<JobStatus> {
        self.status.subscribe()
    }

    pub fn cache(&self) -> &Arc<ArtifactCache> {
        &self.cache
    }

    pub fn status_cell(&self) -> &Arc<StatusCell> {
        &self.status
    }

    /// Single-flight guard. Moves the cell to `Downloading("")` on success.
    fn admit(&self, request: &JobRequest) -> bool {
        if self.status.try_admit() {
            metrics::JOBS_ADMITTED.inc();
            info!(
                locator = %request.source_locator,
                destination = %request.destination_path.display(),
                "Job admitted"
            );
            true
        } else {
            metrics::JOBS_REJECTED.inc();
            debug!(
                locator = %request.source_locator,
                "Job dropped: another job is in flight"
            );
            false
        }
    }

    /// Runs an admitted job and publishes its terminal status.
    async fn drive(&self, request: JobRequest) {
        let started = Instant::now();

        let outcome = AssertUnwindSafe(self.execute(&request))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(JobError::Internal(panic_message(panic.as_ref()))));

        let elapsed = started.elapsed().as_secs_f64();
        match outcome {
            Ok(()) => {
                self.status.set(JobStatus::Completed);
                metrics::JOBS_FINISHED.with_label_values(&["completed"]).inc();
                metrics::JOB_DURATION
                    .with_label_values(&["completed"])
                    .observe(elapsed);
                info!(
                    locator = %request.source_locator,
                    destination = %request.destination_path.display(),
                    elapsed_secs = elapsed,
                    "Job completed"
                );
            }
            Err(e) => {
                let kind = e.kind();
                self.status.set(JobStatus::Error(e.to_string()));
                metrics::JOBS_FINISHED.with_label_values(&["error"]).inc();
                metrics::JOB_ERRORS.with_label_values(&[kind]).inc();
                metrics::JOB_DURATION
                    .with_label_values(&["error"])
                    .observe(elapsed);
                if matches!(e, JobError::Internal(_)) {
                    error!(locator = %request.source_locator, error = %e, "Job crashed");
                } else {
                    warn!(locator = %request.source_locator, kind, error = %e, "Job failed");
                }
            }
        }
    }

    /// The run proper: staging resolution, fetch, transform or placement.
    async fn execute(&self, request: &JobRequest) -> Result<(), JobError> {
        let locator = request.source_locator.as_str();

        let (staging_path, fetched_fresh) = match self.cache.lookup(locator) {
            Some(path) => {
                metrics::CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
                info!(locator, staging = %path.display(), "Reusing cached artifact");
                (path, false)
            }
            None => {
                metrics::CACHE_LOOKUPS.with_label_values(&["miss"]).inc();
                let path = self.staging.new_staging_path().await?;
                self.fetch(locator, &path).await?;
                (path, true)
            }
        };

        if request.requires_transform() {
            self.transform(request, &staging_path).await?;
        } else {
            self.place(&staging_path, &request.destination_path).await?;
        }

        if fetched_fresh {
            self.cache.record(locator, &staging_path);
            debug!(locator, staging = %staging_path.display(), "Cached artifact");
        }

        Ok(())
    }

    /// Fetches `locator` into `staging_path`, mirroring progress into the
    /// `Downloading` payload.
    async fn fetch(&self, locator: &str, staging_path: &Path) -> Result<(), JobError> {
        info!(
            locator,
            fetcher = self.fetcher.name(),
            staging = %staging_path.display(),
            "Fetching source"
        );
        let started = Instant::now();

        let (progress_tx, progress_rx) = mpsc::channel(self.config.progress_channel_capacity);
        let status = Arc::clone(&self.status);
        let listener = ProgressListener::spawn(progress_rx, move |progress: FetchProgress| {
            status.set_progress(Stage::Downloading, render_fetch_progress(&progress));
        });

        let result = self.fetcher.fetch(locator, staging_path, progress_tx).await;
        listener.stop().await;
        let outcome = result?;

        metrics::BYTES_FETCHED.inc_by(outcome.bytes_written);
        metrics::STAGE_DURATION
            .with_label_values(&["fetch"])
            .observe(started.elapsed().as_secs_f64());
        debug!(locator, bytes = outcome.bytes_written, "Fetch finished");
        Ok(())
    }

    /// Trims/resizes the staged file into the destination.
    async fn transform(&self, request: &JobRequest, staging_path: &Path) -> Result<(), JobError> {
        self.status.set(JobStatus::Processing(String::new()));

        let plan = TrimPlan::from_request(request)?;
        info!(
            transcoder = self.transcoder.name(),
            start_seconds = plan.start_seconds,
            duration_seconds = ?plan.duration_seconds,
            resize_height = ?plan.resize_height,
            "Transforming artifact"
        );
        let started = Instant::now();

        let (progress_tx, progress_rx) = mpsc::channel(self.config.progress_channel_capacity);
        let status = Arc::clone(&self.status);
        let listener = ProgressListener::spawn(progress_rx, move |progress: TranscodeProgress| {
            status.set_progress(Stage::Processing, progress.timemark);
        });

        let result = self
            .transcoder
            .transcode(staging_path, &request.destination_path, &plan, progress_tx)
            .await;
        listener.stop().await;
        result?;

        metrics::STAGE_DURATION
            .with_label_values(&["transform"])
            .observe(started.elapsed().as_secs_f64());
        Ok(())
    }

    /// Copies the staged file verbatim to the destination.
    async fn place(&self, staging_path: &Path, destination: &Path) -> Result<(), JobError> {
        let started = Instant::now();
        let bytes = self.staging.place_verbatim(staging_path, destination).await?;

        metrics::STAGE_DURATION
            .with_label_values(&["place"])
            .observe(started.elapsed().as_secs_f64());
        debug!(bytes, destination = %destination.display(), "Placed artifact");
        Ok(())
    }
}

/// Extracts the message of a caught panic.
fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "job panicked".to_string()
    }
}
