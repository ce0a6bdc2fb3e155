//! Progress-callback trait and the simulated progress timer.
//!
//! Inject an [`Arc<dyn SubmissionProgressCallback>`] via
//! [`crate::Orchestrator::with_callback`] to receive events while a
//! submission runs: start/finish (to disable and re-enable a submit control),
//! progress percentages, and transient notifications.
//!
//! # Simulated progress
//!
//! The snapshot request is a single POST whose upload and download progress
//! are not observable, so the percentage is an approximation: a
//! [`ProgressTicker`] adds a fixed step on a fixed cadence up to a cap, then
//! [`ProgressTicker::finish`] snaps it to 100 when the PDF arrives. It says
//! "still working", not "how far along".
//!
//! # Example
//!
//! ```rust
//! use webpdf::SubmissionProgressCallback;
//! use std::sync::atomic::{AtomicU8, Ordering};
//!
//! struct Percent(AtomicU8);
//!
//! impl SubmissionProgressCallback for Percent {
//!     fn on_progress(&self, percent: u8) {
//!         self.0.store(percent, Ordering::SeqCst);
//!     }
//! }
//! ```

use crate::config::SnapshotConfig;
use crate::status::UiStatus;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Called by the orchestrator as a submission progresses.
///
/// Implementations must be `Send + Sync` because progress ticks are emitted
/// from a spawned timer task. All methods have default no-op
/// implementations so callers only override what they care about.
pub trait SubmissionProgressCallback: Send + Sync {
    /// A request is about to be sent. The submit control should be disabled.
    ///
    /// # Arguments
    /// * `image_count` — number of inline images in the request
    fn on_submit_start(&self, image_count: usize) {
        let _ = image_count;
    }

    /// The simulated percentage changed.
    ///
    /// # Arguments
    /// * `percent` — 0–100; 100 only once the PDF has arrived
    fn on_progress(&self, percent: u8) {
        let _ = percent;
    }

    /// The request ended, successfully or not. The submit control may be
    /// re-enabled.
    ///
    /// # Arguments
    /// * `succeeded` — whether a PDF was produced
    fn on_submit_finish(&self, succeeded: bool) {
        let _ = succeeded;
    }

    /// A short-lived notification (toast) accompanying a status change or a
    /// per-file upload warning.
    fn on_notify(&self, status: &UiStatus) {
        let _ = status;
    }
}

/// A no-op implementation for callers that don't need events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl SubmissionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::Orchestrator`].
pub type ProgressCallback = Arc<dyn SubmissionProgressCallback>;

/// Repeating timer that advances a simulated percentage.
///
/// The timer task is aborted when the ticker is finished or dropped, so it
/// cannot outlive the submission that started it.
#[derive(Debug)]
pub struct ProgressTicker {
    percent: Arc<AtomicU8>,
    task: Option<JoinHandle<()>>,
}

impl ProgressTicker {
    /// Start ticking. Reports 0 immediately. Must be called inside a tokio
    /// runtime.
    pub fn start(config: &SnapshotConfig, callback: ProgressCallback) -> Self {
        let percent = Arc::new(AtomicU8::new(0));
        callback.on_progress(0);

        let tick = Duration::from_millis(config.progress_tick_ms.max(1));
        let step = config.progress_step.max(1);
        let cap = config.progress_cap.min(99);
        let shared = Arc::clone(&percent);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            // The first tick of a tokio interval completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let current = shared.load(Ordering::SeqCst);
                if current >= cap {
                    break;
                }
                let next = current.saturating_add(step).min(cap);
                shared.store(next, Ordering::SeqCst);
                callback.on_progress(next);
            }
            debug!("Progress reached cap {}%", cap);
        });

        Self {
            percent,
            task: Some(task),
        }
    }

    /// Current simulated percentage.
    pub fn percent(&self) -> u8 {
        self.percent.load(Ordering::SeqCst)
    }

    /// Stop the timer and snap to 100.
    pub fn finish(mut self, callback: &dyn SubmissionProgressCallback) {
        self.stop();
        self.percent.store(100, Ordering::SeqCst);
        callback.on_progress(100);
    }

    /// True while the timer task is still scheduled.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
