//! Generic job spawning and result plumbing.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tokio::sync::{oneshot, watch};
use tracing::{error, info};

use crate::error::WorkerError;

/// Fire-and-forget progress reporting into a watch channel.
///
/// Sending never blocks and never fails the job: if the consumer is gone
/// or slow the update is simply dropped or overwritten.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    tx: watch::Sender<f64>,
}

impl ProgressSink {
    /// Publishes a fractional progress value in `[0, 1]`.
    pub fn report(&self, progress: f64) {
        let _ = self.tx.send(progress.clamp(0.0, 1.0));
    }
}

/// Handle to a running job: a progress stream plus one terminal result.
pub struct WorkerHandle<T> {
    progress: watch::Receiver<f64>,
    result: oneshot::Receiver<Result<T, WorkerError>>,
}

impl<T> WorkerHandle<T> {
    /// A receiver over the latest reported progress fraction.
    #[must_use]
    pub fn progress(&self) -> watch::Receiver<f64> {
        self.progress.clone()
    }

    /// Waits for the terminal result. Resolves exactly once.
    pub async fn join(self) -> Result<T, WorkerError> {
        self.result
            .await
            .unwrap_or(Err(WorkerError::Disconnected))
    }
}

/// Runs `job` on the blocking thread pool.
///
/// The job receives a [`ProgressSink`] and returns its result, which is
/// delivered through the handle. A panic inside the job becomes a
/// [`WorkerError::JobPanicked`] terminal result.
pub fn spawn_job<T, F>(job: F) -> WorkerHandle<T>
where
    T: Send + 'static,
    F: FnOnce(&ProgressSink) -> Result<T, WorkerError> + Send + 'static,
{
    let (progress_tx, progress_rx) = watch::channel(0.0);
    let (result_tx, result_rx) = oneshot::channel();
    let sink = ProgressSink { tx: progress_tx };

    // The handle carries the result; the join handle itself is not needed.
    let _join = tokio::task::spawn_blocking(move || {
        info!("worker job starting");
        let outcome = catch_unwind(AssertUnwindSafe(|| job(&sink)));
        let terminal = match outcome {
            Ok(result) => result,
            Err(panic) => {
                let msg = panic.downcast_ref::<&str>().map_or_else(
                    || {
                        panic
                            .downcast_ref::<String>()
                            .cloned()
                            .unwrap_or_else(|| "unknown panic".to_string())
                    },
                    std::string::ToString::to_string,
                );
                error!(panic = %msg, "worker job panicked");
                Err(WorkerError::JobPanicked(msg))
            }
        };
        // Receiver may already be gone; nothing to do then.
        let _ = result_tx.send(terminal);
    });

    WorkerHandle {
        progress: progress_rx,
        result: result_rx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_job_delivers_result_and_full_progress() {
        let handle = spawn_job(|sink| {
            for step in 0..=10 {
                sink.report(f64::from(step) / 10.0);
            }
            Ok(42_u64)
        });
        let progress = handle.progress();
        assert_eq!(handle.join().await.unwrap(), 42);
        assert_eq!(*progress.borrow(), 1.0);
    }

    #[tokio::test]
    async fn test_panic_surfaces_as_terminal_error() {
        let handle = spawn_job::<u64, _>(|_| panic!("boom"));
        match handle.join().await {
            Err(WorkerError::JobPanicked(msg)) => assert!(msg.contains("boom")),
            other => panic!("expected panic error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_job_error_passes_through() {
        let handle =
            spawn_job::<u64, _>(|_| Err(WorkerError::JobFailed("bad input".into())));
        assert_eq!(
            handle.join().await,
            Err(WorkerError::JobFailed("bad input".into()))
        );
    }

    #[tokio::test]
    async fn test_progress_is_clamped() {
        let handle = spawn_job(|sink| {
            sink.report(7.0);
            Ok(())
        });
        let progress = handle.progress();
        handle.join().await.unwrap();
        assert_eq!(*progress.borrow(), 1.0);
    }
}
