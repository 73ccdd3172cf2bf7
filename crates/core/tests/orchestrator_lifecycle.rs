//! Orchestrator lifecycle integration tests.
//!
//! These tests drive jobs end to end through the orchestrator with mock
//! fetch and transcode backends:
//! idle -> downloading -> (processing) -> completed | error

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::{mpsc, watch};

use reelfetch_core::{
    testing::{Gate, MockFetcher, MockTranscoder},
    FetchOutcome, FetchProgress, Fetcher, FetcherError, FfmpegTranscoder, JobOrchestrator,
    JobRequest, JobStatus, OrchestratorConfig, Resolution, StagingArea, StagingConfig,
    TranscoderConfig, TranscoderError,
};

const LOCATOR: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

/// Test helper to create all dependencies for orchestrator testing.
struct TestHarness {
    fetcher: Arc<MockFetcher>,
    transcoder: Arc<MockTranscoder>,
    orchestrator: Arc<JobOrchestrator>,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let scratch = temp_dir.path().join("scratch");
        std::fs::create_dir_all(temp_dir.path().join("out")).unwrap();

        Self::with_scratch_dir(temp_dir, scratch)
    }

    fn with_scratch_dir(temp_dir: TempDir, scratch: PathBuf) -> Self {
        let fetcher = Arc::new(MockFetcher::new());
        let transcoder = Arc::new(MockTranscoder::new());
        let staging = StagingArea::new(StagingConfig::default().with_scratch_dir(scratch));

        let orchestrator = Arc::new(JobOrchestrator::new(
            OrchestratorConfig::default(),
            Arc::clone(&fetcher) as Arc<dyn Fetcher>,
            Arc::clone(&transcoder) as Arc<dyn reelfetch_core::Transcoder>,
            staging,
        ));

        Self {
            fetcher,
            transcoder,
            orchestrator,
            temp_dir,
        }
    }

    fn destination(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join("out").join(name)
    }

    fn request(&self, name: &str) -> JobRequest {
        JobRequest::new(LOCATOR, self.destination(name))
    }
}

async fn wait_for_status(
    rx: &mut watch::Receiver<JobStatus>,
    predicate: impl FnMut(&JobStatus) -> bool,
) -> JobStatus {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
        .await
        .expect("timed out waiting for status")
        .expect("status channel closed")
        .clone()
}

#[tokio::test]
async fn test_plain_request_copies_verbatim() {
    let harness = TestHarness::new();
    harness.fetcher.set_payload(b"original bytes".to_vec()).await;

    let status = harness.orchestrator.run(harness.request("plain.mp4")).await;

    assert_eq!(status, JobStatus::Completed);
    assert_eq!(
        std::fs::read(harness.destination("plain.mp4")).unwrap(),
        b"original bytes"
    );
    assert_eq!(harness.fetcher.fetch_count().await, 1);
    assert_eq!(harness.transcoder.transcode_count().await, 0);
    assert_eq!(harness.orchestrator.cache().len(), 1);
}

#[tokio::test]
async fn test_empty_trim_fields_skip_transform() {
    let harness = TestHarness::new();
    let request = harness
        .request("plain.mp4")
        .with_trim_start("")
        .with_trim_end("");

    let status = harness.orchestrator.run(request).await;

    assert_eq!(status, JobStatus::Completed);
    assert_eq!(harness.transcoder.transcode_count().await, 0);
}

#[tokio::test]
async fn test_trim_request_passes_through_processing() {
    let harness = TestHarness::new();
    let gate = Gate::new();
    harness.transcoder.set_gate(Arc::clone(&gate)).await;

    let request = harness
        .request("clip.mp4")
        .with_trim_start("00:00:10")
        .with_trim_end("00:00:25");
    assert!(harness.orchestrator.submit(request));

    gate.wait_entered().await;
    assert!(matches!(
        harness.orchestrator.current_status(),
        JobStatus::Processing(_)
    ));

    gate.release();
    let mut rx = harness.orchestrator.subscribe();
    let status = wait_for_status(&mut rx, JobStatus::is_terminal).await;
    assert_eq!(status, JobStatus::Completed);

    let transcodes = harness.transcoder.recorded_transcodes().await;
    assert_eq!(transcodes.len(), 1);
    assert_eq!(transcodes[0].plan.start_seconds, 10);
    assert_eq!(transcodes[0].plan.duration_seconds, Some(15));
    assert_eq!(transcodes[0].plan.resize_height, None);
    assert_eq!(transcodes[0].output, harness.destination("clip.mp4"));
    assert!(harness.destination("clip.mp4").exists());
}

#[tokio::test]
async fn test_resize_only_request_transforms() {
    let harness = TestHarness::new();
    let request = harness
        .request("small.mp4")
        .with_resolution(Resolution::P360);

    let status = harness.orchestrator.run(request).await;

    assert_eq!(status, JobStatus::Completed);
    let transcodes = harness.transcoder.recorded_transcodes().await;
    assert_eq!(transcodes.len(), 1);
    assert_eq!(transcodes[0].plan.start_seconds, 0);
    assert_eq!(transcodes[0].plan.duration_seconds, None);
    assert_eq!(transcodes[0].plan.resize_height, Some(360));
}

#[tokio::test]
async fn test_submit_while_busy_is_dropped() {
    let harness = TestHarness::new();
    let gate = Gate::new();
    harness.fetcher.set_gate(Arc::clone(&gate)).await;

    assert!(harness.orchestrator.submit(harness.request("first.mp4")));
    assert_eq!(
        harness.orchestrator.current_status(),
        JobStatus::Downloading(String::new())
    );
    gate.wait_entered().await;

    let before = harness.orchestrator.current_status();
    let second = JobRequest::new("https://example.com/other", harness.destination("second.mp4"));
    assert!(!harness.orchestrator.submit(second.clone()));
    assert_eq!(harness.orchestrator.run(second).await, before);
    assert_eq!(harness.orchestrator.current_status(), before);

    gate.release();
    let mut rx = harness.orchestrator.subscribe();
    assert_eq!(
        wait_for_status(&mut rx, JobStatus::is_terminal).await,
        JobStatus::Completed
    );

    let fetches = harness.fetcher.recorded_fetches().await;
    assert_eq!(fetches.len(), 1);
    assert_eq!(fetches[0].source_locator, LOCATOR);
    assert!(!harness.destination("second.mp4").exists());
}

#[tokio::test]
async fn test_accepts_new_job_after_terminal_state() {
    let harness = TestHarness::new();
    harness
        .fetcher
        .set_next_error(FetcherError::source_failed(LOCATOR, "unavailable"))
        .await;

    let status = harness.orchestrator.run(harness.request("a.mp4")).await;
    assert!(matches!(status, JobStatus::Error(_)));

    let status = harness.orchestrator.run(harness.request("a.mp4")).await;
    assert_eq!(status, JobStatus::Completed);

    let status = harness.orchestrator.run(harness.request("b.mp4")).await;
    assert_eq!(status, JobStatus::Completed);
}

#[tokio::test]
async fn test_second_run_reuses_cached_artifact() {
    let harness = TestHarness::new();

    assert_eq!(
        harness.orchestrator.run(harness.request("full.mp4")).await,
        JobStatus::Completed
    );
    let staged = harness.fetcher.recorded_fetches().await[0].destination.clone();

    let request = harness
        .request("clip.mp4")
        .with_trim_end("00:00:30");
    assert_eq!(harness.orchestrator.run(request).await, JobStatus::Completed);

    assert_eq!(harness.fetcher.fetch_count().await, 1);
    let transcodes = harness.transcoder.recorded_transcodes().await;
    assert_eq!(transcodes.len(), 1);
    assert_eq!(transcodes[0].input, staged);
    assert_eq!(harness.orchestrator.cache().lookup(LOCATOR), Some(staged));
}

#[tokio::test]
async fn test_fetch_progress_is_reflected_before_completion() {
    let harness = TestHarness::new();
    let gate = Gate::new();
    harness.fetcher.set_gate(Arc::clone(&gate)).await;
    harness
        .fetcher
        .set_progress(vec![
            FetchProgress::new(1_048_576, Some(3_145_728)),
            FetchProgress::new(3_145_728, Some(3_145_728)),
        ])
        .await;

    let mut rx = harness.orchestrator.subscribe();
    assert!(harness.orchestrator.submit(harness.request("video.mp4")));
    gate.wait_entered().await;

    let status = wait_for_status(&mut rx, |s| {
        *s == JobStatus::Downloading("3 of 3 MB".to_string())
    })
    .await;
    assert_eq!(status.payload(), "3 of 3 MB");

    gate.release();
    assert_eq!(
        wait_for_status(&mut rx, JobStatus::is_terminal).await,
        JobStatus::Completed
    );

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(harness.orchestrator.current_status(), JobStatus::Completed);
}

#[tokio::test]
async fn test_transcode_progress_is_reflected() {
    let harness = TestHarness::new();
    let gate = Gate::new();
    harness.transcoder.set_gate(Arc::clone(&gate)).await;
    harness
        .transcoder
        .set_timemarks(["00:00:01.00", "00:00:02.50"])
        .await;

    let mut rx = harness.orchestrator.subscribe();
    let request = harness
        .request("clip.mp4")
        .with_resolution(Resolution::P720);
    assert!(harness.orchestrator.submit(request));
    gate.wait_entered().await;

    wait_for_status(&mut rx, |s| {
        *s == JobStatus::Processing("00:00:02.50".to_string())
    })
    .await;

    gate.release();
    assert_eq!(
        wait_for_status(&mut rx, JobStatus::is_terminal).await,
        JobStatus::Completed
    );
}

#[tokio::test]
async fn test_fetch_failure_leaves_cache_untouched() {
    let harness = TestHarness::new();
    harness
        .fetcher
        .set_next_error(FetcherError::source_failed(LOCATOR, "video unavailable"))
        .await;

    let status = harness.orchestrator.run(harness.request("video.mp4")).await;

    assert_eq!(
        status,
        JobStatus::Error(format!("Failed to fetch {}: video unavailable", LOCATOR))
    );
    assert!(harness.orchestrator.cache().is_empty());
    assert!(!harness.destination("video.mp4").exists());
}

#[tokio::test]
async fn test_invalid_trim_window_fails_after_fetch() {
    let harness = TestHarness::new();
    let request = harness
        .request("clip.mp4")
        .with_trim_start("01:01:01")
        .with_trim_end("01:00:01");

    let status = harness.orchestrator.run(request).await;

    assert_eq!(
        status,
        JobStatus::Error(
            "invalid trim window: end time 01:00:01 must be after start time 01:01:01"
                .to_string()
        )
    );
    assert_eq!(harness.fetcher.fetch_count().await, 1);
    assert_eq!(harness.transcoder.transcode_count().await, 0);
    assert!(harness.orchestrator.cache().is_empty());
}

#[tokio::test]
async fn test_placement_failure_is_reported() {
    let harness = TestHarness::new();
    let destination = harness.temp_dir.path().join("missing").join("video.mp4");

    let status = harness
        .orchestrator
        .run(JobRequest::new(LOCATOR, destination))
        .await;

    match status {
        JobStatus::Error(message) => assert!(message.starts_with("failed to place file")),
        other => panic!("expected error, got {:?}", other),
    }
    assert!(harness.orchestrator.cache().is_empty());
}

#[tokio::test]
async fn test_transform_failure_after_cache_hit_keeps_entry() {
    let harness = TestHarness::new();
    assert_eq!(
        harness.orchestrator.run(harness.request("full.mp4")).await,
        JobStatus::Completed
    );
    let cached = harness.orchestrator.cache().lookup(LOCATOR).unwrap();

    harness
        .transcoder
        .set_next_error(TranscoderError::conversion_failed(
            "FFmpeg exited with code: Some(1)",
            None,
        ))
        .await;
    let request = harness
        .request("clip.mp4")
        .with_trim_start("00:00:05");

    let status = harness.orchestrator.run(request).await;

    assert_eq!(
        status,
        JobStatus::Error("Transcoding failed: FFmpeg exited with code: Some(1)".to_string())
    );
    assert_eq!(harness.orchestrator.cache().lookup(LOCATOR), Some(cached));
    assert_eq!(harness.fetcher.fetch_count().await, 1);
}

#[tokio::test]
async fn test_staging_allocation_failure() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("scratch");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let harness = TestHarness::with_scratch_dir(temp_dir, blocker.join("nested"));

    let status = harness.orchestrator.run(harness.request("video.mp4")).await;

    match status {
        JobStatus::Error(message) => {
            assert!(message.starts_with("failed to allocate staging file"))
        }
        other => panic!("expected error, got {:?}", other),
    }
    assert_eq!(harness.fetcher.fetch_count().await, 0);
}

/// A fetcher that panics mid-run.
struct PanickingFetcher;

#[async_trait]
impl Fetcher for PanickingFetcher {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn fetch(
        &self,
        _source_locator: &str,
        _destination: &Path,
        progress_tx: mpsc::Sender<FetchProgress>,
    ) -> Result<FetchOutcome, FetcherError> {
        let _ = progress_tx.send(FetchProgress::new(1, Some(2))).await;
        panic!("decoder exploded");
    }
}

#[tokio::test]
async fn test_panic_inside_run_becomes_error() {
    let temp_dir = TempDir::new().unwrap();
    let orchestrator = Arc::new(JobOrchestrator::new(
        OrchestratorConfig::default(),
        Arc::new(PanickingFetcher),
        Arc::new(MockTranscoder::new()),
        StagingArea::new(StagingConfig::default().with_scratch_dir(temp_dir.path().to_path_buf())),
    ));

    let mut rx = orchestrator.subscribe();
    assert!(orchestrator.submit(JobRequest::new(
        LOCATOR,
        temp_dir.path().join("video.mp4")
    )));

    let status = wait_for_status(&mut rx, JobStatus::is_terminal).await;
    assert_eq!(
        status,
        JobStatus::Error("internal error: decoder exploded".to_string())
    );
    assert!(orchestrator.cache().is_empty());

    // The guard is open again
    let status = orchestrator
        .run(JobRequest::new(LOCATOR, temp_dir.path().join("again.mp4")))
        .await;
    assert!(matches!(status, JobStatus::Error(_)));
}

/// A fetcher that keeps a clone of the progress sender after it returns.
#[derive(Default)]
struct LeakingFetcher {
    leaked: Mutex<Option<mpsc::Sender<FetchProgress>>>,
}

impl LeakingFetcher {
    fn take_sender(&self) -> mpsc::Sender<FetchProgress> {
        self.leaked.lock().unwrap().take().expect("fetch never ran")
    }
}

#[async_trait]
impl Fetcher for LeakingFetcher {
    fn name(&self) -> &str {
        "leaking"
    }

    async fn fetch(
        &self,
        _source_locator: &str,
        destination: &Path,
        progress_tx: mpsc::Sender<FetchProgress>,
    ) -> Result<FetchOutcome, FetcherError> {
        *self.leaked.lock().unwrap() = Some(progress_tx.clone());
        tokio::fs::write(destination, b"leaked payload")
            .await
            .map_err(|e| FetcherError::write_failed(destination, e))?;
        Ok(FetchOutcome {
            path: destination.to_path_buf(),
            bytes_written: 14,
        })
    }
}

#[tokio::test]
async fn test_progress_after_fetch_stage_never_reaches_status() {
    let temp_dir = TempDir::new().unwrap();
    let fetcher = Arc::new(LeakingFetcher::default());
    let transcoder = Arc::new(MockTranscoder::new());
    let orchestrator = Arc::new(JobOrchestrator::new(
        OrchestratorConfig::default(),
        Arc::clone(&fetcher) as Arc<dyn Fetcher>,
        Arc::clone(&transcoder) as Arc<dyn reelfetch_core::Transcoder>,
        StagingArea::new(StagingConfig::default().with_scratch_dir(temp_dir.path().join("scratch"))),
    ));

    let status = orchestrator
        .run(JobRequest::new(LOCATOR, temp_dir.path().join("first.mp4")))
        .await;
    assert_eq!(status, JobStatus::Completed);

    // The listener is gone once the fetch stage ends.
    let stale = fetcher.take_sender();
    assert!(stale
        .send(FetchProgress::new(9_437_184, Some(9_437_184)))
        .await
        .is_err());
    assert_eq!(orchestrator.current_status(), JobStatus::Completed);

    // Nor does it leak into a later run, which hits the cache.
    let gate = Gate::new();
    transcoder.set_gate(Arc::clone(&gate)).await;
    let mut rx = orchestrator.subscribe();
    let request = JobRequest::new(LOCATOR, temp_dir.path().join("second.mp4"))
        .with_resolution(Resolution::P720);
    assert!(orchestrator.submit(request));
    gate.wait_entered().await;

    assert!(stale.try_send(FetchProgress::new(1, Some(1))).is_err());
    assert_eq!(
        orchestrator.current_status(),
        JobStatus::Processing(String::new())
    );

    gate.release();
    let seen = wait_for_status(&mut rx, JobStatus::is_terminal).await;
    assert_eq!(seen, JobStatus::Completed);
}

#[cfg(unix)]
#[tokio::test]
async fn test_ffmpeg_failure_message_reaches_status() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let stub = temp_dir.path().join("ffmpeg");
    std::fs::write(
        &stub,
        "#!/bin/sh\n\
         echo 'Error opening input: Invalid data found when processing input' >&2\n\
         exit 1\n",
    )
    .unwrap();
    std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();

    let orchestrator = JobOrchestrator::new(
        OrchestratorConfig::default(),
        Arc::new(MockFetcher::new()),
        Arc::new(FfmpegTranscoder::new(
            TranscoderConfig::default().with_ffmpeg_path(stub),
        )),
        StagingArea::new(StagingConfig::default().with_scratch_dir(temp_dir.path().join("scratch"))),
    );

    let request = JobRequest::new(LOCATOR, temp_dir.path().join("clip.mp4"))
        .with_trim_start("00:00:05")
        .with_trim_end("00:00:10");
    let status = orchestrator.run(request).await;

    assert_eq!(
        status,
        JobStatus::Error(
            "Transcoding failed: FFmpeg exited with code: Some(1): \
             Error opening input: Invalid data found when processing input"
                .to_string()
        )
    );
}
