//! Stage-scoped progress listeners.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::fetcher::FetchProgress;

const BYTES_PER_MB: f64 = 1_048_576.0;

/// Renders a fetch progress event as `"<transferred> of <total> MB"`.
///
/// Both figures are whole megabytes, rounded. An unknown total renders
/// as `?`.
pub fn render_fetch_progress(progress: &FetchProgress) -> String {
    let to_mb = |bytes: u64| (bytes as f64 / BYTES_PER_MB).round() as u64;
    match progress.total_bytes {
        Some(total) => format!("{} of {} MB", to_mb(progress.transferred_bytes), to_mb(total)),
        None => format!("{} of ? MB", to_mb(progress.transferred_bytes)),
    }
}

/// A spawned task feeding progress events into a callback for one stage.
///
/// The task ends when the producer drops its sender or when the listener
/// is stopped. Buffered events are drained before a stop is honoured.
/// Dropping the listener without [`stop`](Self::stop) cancels and aborts
/// the task.
pub(crate) struct ProgressListener {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ProgressListener {
    pub(crate) fn spawn<T, F>(mut rx: mpsc::Receiver<T>, mut on_event: F) -> Self
    where
        T: Send + 'static,
        F: FnMut(T) + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    event = rx.recv() => match event {
                        Some(event) => on_event(event),
                        None => break,
                    },
                    _ = token.cancelled() => break,
                }
            }
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Cancels the task and waits for it to finish.
    pub(crate) async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for ProgressListener {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
