//! Debounced URL re-validation.
//!
//! Validating on every keystroke would flash "invalid URL" while the user is
//! still typing `https://`. [`UrlWatcher`] waits until the field has been
//! stable for the configured delay, then publishes a [`UrlVerdict`] on a
//! `watch` channel. Each edit aborts the pending check, and dropping the
//! watcher aborts whatever is still scheduled.

use crate::pipeline::validate::{check_url, UrlVerdict};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug)]
pub struct UrlWatcher {
    delay: Duration,
    tx: watch::Sender<UrlVerdict>,
    pending: Option<JoinHandle<()>>,
}

impl UrlWatcher {
    pub fn new(delay: Duration) -> Self {
        let (tx, _rx) = watch::channel(UrlVerdict::Empty);
        Self {
            delay,
            tx,
            pending: None,
        }
    }

    /// Record an edit. The verdict is published once no further edit arrives
    /// within the delay. Must be called inside a tokio runtime.
    pub fn edit(&mut self, input: impl Into<String>) {
        self.cancel();
        let input = input.into();
        let delay = self.delay;
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let verdict = check_url(&input);
            debug!("Debounced URL check: {:?}", verdict);
            tx.send_replace(verdict);
        }));
    }

    /// Receiver of debounced verdicts.
    pub fn subscribe(&self) -> watch::Receiver<UrlVerdict> {
        self.tx.subscribe()
    }

    /// Most recently published verdict.
    pub fn current(&self) -> UrlVerdict {
        self.tx.borrow().clone()
    }

    /// Abort any pending check.
    pub fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }

    /// Abort any pending check and publish [`UrlVerdict::Empty`].
    pub fn reset(&mut self) {
        self.cancel();
        self.tx.send_replace(UrlVerdict::Empty);
    }
}

impl Drop for UrlWatcher {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn only_the_last_edit_is_checked() {
        let mut watcher = UrlWatcher::new(Duration::from_millis(400));
        let mut rx = watcher.subscribe();

        watcher.edit("h");
        tokio::time::sleep(Duration::from_millis(100)).await;
        watcher.edit("https://exa");
        tokio::time::sleep(Duration::from_millis(100)).await;
        watcher.edit("https://example.org");

        // Nothing published while edits keep arriving.
        assert!(!rx.has_changed().unwrap());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.has_changed().unwrap());
        assert!(matches!(*rx.borrow_and_update(), UrlVerdict::Valid(_)));

        // The aborted "h" check never fires afterwards.
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_input_is_published() {
        let mut watcher = UrlWatcher::new(Duration::from_millis(50));
        watcher.edit("not a url");
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(watcher.current().is_invalid());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_pending_check() {
        let mut watcher = UrlWatcher::new(Duration::from_millis(50));
        watcher.edit("not a url");
        watcher.reset();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(watcher.current(), UrlVerdict::Empty);
    }
}
