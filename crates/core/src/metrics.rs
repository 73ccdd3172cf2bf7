//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Job admission (accepted and rejected submissions)
//! - Job outcomes and durations
//! - Artifact cache lookups
//! - Fetch and transform stages

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Admission
// =============================================================================

/// Submissions accepted by the single-flight guard.
pub static JOBS_ADMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "reelfetch_jobs_admitted_total",
        "Total job submissions admitted",
    )
    .unwrap()
});

/// Submissions dropped because a job was already in flight.
pub static JOBS_REJECTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "reelfetch_jobs_rejected_total",
        "Total job submissions dropped while busy",
    )
    .unwrap()
});

// =============================================================================
// Job outcomes
// =============================================================================

/// Finished jobs by result.
pub static JOBS_FINISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reelfetch_jobs_finished_total", "Total finished jobs"),
        &["result"], // "completed", "error"
    )
    .unwrap()
});

/// Failed jobs by error kind.
pub static JOB_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reelfetch_job_errors_total", "Total failed jobs by error kind"),
        &["kind"],
    )
    .unwrap()
});

/// End-to-end job duration in seconds.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("reelfetch_job_duration_seconds", "Duration of job runs")
            .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// Stages
// =============================================================================

/// Artifact cache lookups by result.
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reelfetch_cache_lookups_total",
            "Total artifact cache lookups",
        ),
        &["result"], // "hit", "miss"
    )
    .unwrap()
});

/// Bytes written to staging files by fetches.
pub static BYTES_FETCHED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "reelfetch_fetched_bytes_total",
        "Total bytes fetched into staging files",
    )
    .unwrap()
});

/// Stage duration in seconds.
pub static STAGE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "reelfetch_stage_duration_seconds",
            "Duration of job stages",
        )
        .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0, 900.0]),
        &["stage"], // "fetch", "transform", "place"
    )
    .unwrap()
});

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Admission
        Box::new(JOBS_ADMITTED.clone()),
        Box::new(JOBS_REJECTED.clone()),
        // Outcomes
        Box::new(JOBS_FINISHED.clone()),
        Box::new(JOB_ERRORS.clone()),
        Box::new(JOB_DURATION.clone()),
        // Stages
        Box::new(CACHE_LOOKUPS.clone()),
        Box::new(BYTES_FETCHED.clone()),
        Box::new(STAGE_DURATION.clone()),
    ]
}
