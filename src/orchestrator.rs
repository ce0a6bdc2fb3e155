//! The PDF request orchestrator: form state, submission state machine and
//! artifact ownership in one place.
//!
//! ## Submission lifecycle
//!
//! ```text
//! Idle ──submit──▶ Validating ──rejected──▶ Idle (error status)
//!                      │
//!                      └──▶ Submitting ──ok──▶ Ready   (artifact held)
//!                                      └─err─▶ Errored (error status)
//! ```
//!
//! `submit` takes `&mut self`, so a second submission cannot start while one
//! is in flight; [`Orchestrator::can_submit`] and the
//! [`crate::SubmissionProgressCallback`] start/finish events let a UI grey out its
//! submit control for the same period.
//!
//! ## Artifact ownership
//!
//! The orchestrator is the only owner of the current [`GeneratedArtifact`].
//! Starting a submission drops the previous one before the request goes out,
//! so at most one generation's reference is ever live.

use crate::artifact::{ArtifactInfo, ArtifactStore, GeneratedArtifact};
use crate::config::{RenderOptions, SnapshotConfig, DOWNLOAD_FILENAME, PLACEHOLDER_URL};
use crate::debounce::UrlWatcher;
use crate::error::{UploadRejection, WebPdfError};
use crate::pipeline::request::SnapshotRequest;
use crate::pipeline::transport::{interpret_response, HttpTransport, SnapshotTransport};
use crate::pipeline::upload::{self, ImageCandidate, UploadedImage};
use crate::pipeline::validate::{self, UrlVerdict};
use crate::present::{PrintError, PrintHost, ShareError, ShareHost, SharedFile};
use crate::progress::{NoopProgressCallback, ProgressCallback, ProgressTicker};
use crate::status::{
    UiStatus, MSG_CREATED, MSG_NO_PDF_TO_DOWNLOAD, MSG_NO_PDF_TO_PRINT, MSG_NO_PDF_TO_SHARE,
    MSG_SHARED, SHARE_TEXT, SHARE_TITLE,
};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Everything the user edits on the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub url: String,
    pub options: RenderOptions,
    pub images: Vec<UploadedImage>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            url: PLACEHOLDER_URL.to_string(),
            options: RenderOptions::default(),
            images: Vec::new(),
        }
    }
}

impl FormState {
    /// The state after "clear": like the default but with an empty URL.
    pub fn cleared() -> Self {
        Self {
            url: String::new(),
            ..Self::default()
        }
    }
}

/// Where the current submission stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubmissionPhase {
    /// Nothing generated yet, or the form was cleared or a submission was
    /// rejected by validation.
    #[default]
    Idle,
    Validating,
    /// A request is in flight.
    Submitting,
    /// The last submission produced a PDF.
    Ready,
    /// The last submission failed after the request was sent.
    Errored,
}

/// Result of [`Orchestrator::share`] when nothing went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// The user dismissed the share flow. The status line is left untouched.
    Cancelled,
}

/// Form/state controller for one user session.
pub struct Orchestrator<T: SnapshotTransport> {
    transport: T,
    config: SnapshotConfig,
    callback: ProgressCallback,
    form: FormState,
    phase: SubmissionPhase,
    status: UiStatus,
    store: ArtifactStore,
    artifact: Option<GeneratedArtifact>,
    url_watcher: UrlWatcher,
}

impl Orchestrator<HttpTransport> {
    /// Orchestrator talking to `config.endpoint` over HTTP.
    pub fn from_config(config: SnapshotConfig) -> Result<Self, WebPdfError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: SnapshotTransport> Orchestrator<T> {
    pub fn new(transport: T, config: SnapshotConfig) -> Self {
        let url_watcher = UrlWatcher::new(Duration::from_millis(config.debounce_ms));
        Self {
            transport,
            config,
            callback: Arc::new(NoopProgressCallback),
            form: FormState::default(),
            phase: SubmissionPhase::Idle,
            status: UiStatus::default(),
            store: ArtifactStore::new(),
            artifact: None,
            url_watcher,
        }
    }

    /// Receive progress, start/finish and notification events.
    pub fn with_callback(mut self, callback: ProgressCallback) -> Self {
        self.callback = callback;
        self
    }

    // ── Form ─────────────────────────────────────────────────────────────

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    pub fn options_mut(&mut self) -> &mut RenderOptions {
        &mut self.form.options
    }

    /// Replace the URL without scheduling a debounced check.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.form.url = url.into();
    }

    /// Replace the URL as a keystroke would: the field is updated at once and
    /// re-validated after the debounce delay. Must be called inside a tokio
    /// runtime.
    pub fn edit_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        self.url_watcher.edit(url.clone());
        self.form.url = url;
    }

    /// Debounced verdicts for [`Orchestrator::edit_url`].
    pub fn url_verdict(&self) -> watch::Receiver<UrlVerdict> {
        self.url_watcher.subscribe()
    }

    /// Physical page size for the selected format and orientation.
    pub fn size_hint(&self) -> String {
        self.form.options.size_hint()
    }

    /// Read, check and append images. Returns the files that were refused;
    /// each one is also announced through `on_notify`.
    pub async fn add_images(&mut self, candidates: Vec<ImageCandidate>) -> Vec<UploadRejection> {
        let batch = upload::load_images(candidates, self.config.upload_concurrency).await;
        self.form.images.extend(batch.accepted);
        for rejection in &batch.rejected {
            self.callback.on_notify(&UiStatus::error(rejection.to_string()));
        }
        batch.rejected
    }

    /// Remove the image at `index` in [`FormState::images`] (the order the
    /// reads completed in, not necessarily the order files were picked).
    pub fn remove_image(&mut self, index: usize) -> Option<UploadedImage> {
        if index < self.form.images.len() {
            Some(self.form.images.remove(index))
        } else {
            None
        }
    }

    // ── Submission ───────────────────────────────────────────────────────

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// False while a request is in flight.
    pub fn can_submit(&self) -> bool {
        self.phase != SubmissionPhase::Submitting
    }

    pub fn status(&self) -> &UiStatus {
        &self.status
    }

    pub fn artifact(&self) -> Option<&GeneratedArtifact> {
        self.artifact.as_ref()
    }

    /// `"A4 | portrait | 48.8 KB | …"` for the current artifact.
    pub fn info_line(&self) -> Option<String> {
        self.artifact.as_ref().map(GeneratedArtifact::info_line)
    }

    /// Number of artifact references currently alive (current artifact plus
    /// any print in progress).
    pub fn live_references(&self) -> usize {
        self.store.live_references()
    }

    /// Build the request the form would send, without sending it.
    pub fn build_request(&self) -> Result<SnapshotRequest, WebPdfError> {
        let target = validate::resolve_target(&self.form.url, self.form.images.len())?;
        Ok(SnapshotRequest::new(
            target.map(String::from),
            &self.form.options,
            &self.form.images,
        ))
    }

    /// Validate the form, send one request and keep the resulting PDF.
    ///
    /// # Errors
    /// - [`WebPdfError::InvalidUrl`] / [`WebPdfError::MissingInput`]:
    ///   nothing was sent; the previous artifact is kept.
    /// - Transport and service errors: the previous artifact was already
    ///   released; no artifact is held afterwards.
    pub async fn submit(&mut self) -> Result<ArtifactInfo, WebPdfError> {
        self.phase = SubmissionPhase::Validating;
        let request = match self.build_request() {
            Ok(r) => r,
            Err(e) => {
                debug!("Submission rejected: {:?}", e);
                self.phase = SubmissionPhase::Idle;
                self.report_error(&e);
                return Err(e);
            }
        };

        if self.artifact.take().is_some() {
            debug!("Released previous artifact before submitting");
        }
        self.status = UiStatus::default();

        let start = Instant::now();
        let format = self.form.options.format;
        let orientation = self.form.options.orientation;
        let guard = SubmissionGuard::enter(&mut self.phase, Arc::clone(&self.callback));
        self.callback.on_submit_start(request.images.len());
        let ticker = ProgressTicker::start(&self.config, Arc::clone(&self.callback));

        let outcome = match self.transport.send(&request).await {
            Ok(response) => interpret_response(response).and_then(|bytes| {
                let handle = self.store.create(&bytes)?;
                Ok(GeneratedArtifact::new(bytes, format, orientation, handle))
            }),
            Err(e) => Err(e),
        };
        guard.disarm();

        match outcome {
            Ok(artifact) => {
                ticker.finish(self.callback.as_ref());
                info!(
                    "PDF ready: {} in {}ms",
                    artifact.info_line(),
                    start.elapsed().as_millis()
                );
                let info = artifact.info();
                self.artifact = Some(artifact);
                self.phase = SubmissionPhase::Ready;
                self.set_status(UiStatus::success(MSG_CREATED));
                self.callback.on_submit_finish(true);
                Ok(info)
            }
            Err(e) => {
                drop(ticker);
                warn!("Submission failed after {}ms: {}", start.elapsed().as_millis(), e);
                self.phase = SubmissionPhase::Errored;
                self.report_error(&e);
                self.callback.on_submit_finish(false);
                Err(e)
            }
        }
    }

    // ── Post-generation actions ──────────────────────────────────────────

    /// Write the current PDF to `dest`. A directory gets
    /// [`DOWNLOAD_FILENAME`] inside it. The write is atomic (temp file in the
    /// target directory, then persisted by rename).
    pub async fn download(&mut self, dest: impl AsRef<Path>) -> Result<PathBuf, WebPdfError> {
        let result = self.download_inner(dest.as_ref()).await;
        if let Err(ref e) = result {
            self.report_error(e);
        }
        result
    }

    async fn download_inner(&self, dest: &Path) -> Result<PathBuf, WebPdfError> {
        let artifact = self
            .artifact
            .as_ref()
            .ok_or(WebPdfError::NoArtifact(MSG_NO_PDF_TO_DOWNLOAD))?;

        let path = match tokio::fs::metadata(dest).await {
            Ok(meta) if meta.is_dir() => dest.join(DOWNLOAD_FILENAME),
            _ => dest.to_path_buf(),
        };
        let write_failed = |source: std::io::Error| WebPdfError::OutputWriteFailed {
            path: path.clone(),
            source,
        };

        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        tokio::fs::create_dir_all(&parent).await.map_err(write_failed)?;

        // Atomic write: temp file next to the target, then persist (rename).
        // A temp file that never gets persisted is deleted on drop.
        let bytes = artifact.bytes().to_vec();
        let target = path.clone();
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut tmp = tempfile::Builder::new()
                .prefix(".webpdf-")
                .suffix(".tmp")
                .tempfile_in(&parent)?;
            tmp.write_all(&bytes)?;
            tmp.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| WebPdfError::Internal(format!("download task failed: {e}")))?
        .map_err(write_failed)?;

        info!("Saved {} bytes to {}", artifact.size(), path.display());
        Ok(path)
    }

    /// Print the current PDF through `host`.
    ///
    /// A separate reference is created for the print job and released as
    /// soon as the host returns.
    pub async fn print<P: PrintHost>(&mut self, host: &P) -> Result<(), WebPdfError> {
        let result = self.print_inner(host).await;
        if let Err(ref e) = result {
            self.report_error(e);
        }
        result
    }

    async fn print_inner<P: PrintHost>(&self, host: &P) -> Result<(), WebPdfError> {
        let artifact = self
            .artifact
            .as_ref()
            .ok_or(WebPdfError::NoArtifact(MSG_NO_PDF_TO_PRINT))?;

        let job = self.store.create(artifact.bytes())?;
        host.print(job.path()).await.map_err(|e| match e {
            PrintError::Blocked(detail) => WebPdfError::PopupBlocked { detail },
            PrintError::Failed(detail) => WebPdfError::PrintFailed(detail),
        })
    }

    /// Offer the current PDF to `host`'s share flow.
    pub fn share(&mut self, host: &dyn ShareHost) -> Result<ShareOutcome, WebPdfError> {
        let result = match self.artifact.as_ref() {
            None => Err(WebPdfError::NoArtifact(MSG_NO_PDF_TO_SHARE)),
            Some(artifact) => {
                let file = SharedFile {
                    name: DOWNLOAD_FILENAME,
                    mime: "application/pdf",
                    title: SHARE_TITLE,
                    text: SHARE_TEXT,
                    bytes: artifact.bytes(),
                };
                if !host.can_share(&file) {
                    Err(WebPdfError::ShareUnsupported)
                } else {
                    match host.share(&file) {
                        Ok(()) => Ok(ShareOutcome::Shared),
                        Err(ShareError::Cancelled) => Ok(ShareOutcome::Cancelled),
                        Err(ShareError::Failed(msg)) => Err(WebPdfError::ShareFailed(msg)),
                    }
                }
            }
        };

        match &result {
            Ok(ShareOutcome::Shared) => self.set_status(UiStatus::success(MSG_SHARED)),
            Ok(ShareOutcome::Cancelled) => debug!("Share cancelled by user"),
            Err(e) => self.report_error(e),
        }
        result
    }

    /// Reset every field, release the artifact and cancel pending checks.
    pub fn clear(&mut self) {
        self.url_watcher.reset();
        self.form = FormState::cleared();
        self.artifact = None;
        self.status = UiStatus::default();
        self.phase = SubmissionPhase::Idle;
        debug!("Form cleared");
    }

    // ── Internal helpers ─────────────────────────────────────────────────

    fn set_status(&mut self, status: UiStatus) {
        self.callback.on_notify(&status);
        self.status = status;
    }

    fn report_error(&mut self, err: &WebPdfError) {
        self.set_status(UiStatus::from_error(err));
    }
}

/// Holds the phase at `Submitting` while a request is in flight.
///
/// If the `submit` future is dropped before the service answers, the guard
/// moves the phase to `Errored` and reports `on_submit_finish(false)`, so the
/// controller is never left waiting on a request nobody will complete.
struct SubmissionGuard<'a> {
    phase: &'a mut SubmissionPhase,
    callback: ProgressCallback,
    armed: bool,
}

impl<'a> SubmissionGuard<'a> {
    fn enter(phase: &'a mut SubmissionPhase, callback: ProgressCallback) -> Self {
        *phase = SubmissionPhase::Submitting;
        Self {
            phase,
            callback,
            armed: true,
        }
    }

    /// The request completed; the caller takes over the phase.
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("Submission dropped before the service answered");
            *self.phase = SubmissionPhase::Errored;
            self.callback.on_submit_finish(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::transport::SnapshotResponse;
    use crate::status::Severity;
    use std::sync::Mutex;

    /// Replies with `status`/`body` and records every request.
    struct FixedTransport {
        status: u16,
        body: Vec<u8>,
        sent: Mutex<Vec<SnapshotRequest>>,
    }

    impl FixedTransport {
        fn new(status: u16, body: &[u8]) -> Self {
            Self {
                status,
                body: body.to_vec(),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl SnapshotTransport for FixedTransport {
        async fn send(&self, request: &SnapshotRequest) -> Result<SnapshotResponse, WebPdfError> {
            self.sent.lock().unwrap().push(request.clone());
            Ok(SnapshotResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    fn orchestrator(status: u16, body: &[u8]) -> Orchestrator<FixedTransport> {
        Orchestrator::new(FixedTransport::new(status, body), SnapshotConfig::default())
    }

    #[test]
    fn starts_idle_with_placeholder() {
        let o = orchestrator(200, b"%PDF");
        assert_eq!(o.phase(), SubmissionPhase::Idle);
        assert_eq!(o.form().url, PLACEHOLDER_URL);
        assert!(o.can_submit());
        assert!(o.status().is_empty());
        assert_eq!(o.size_hint(), "8.3 × 11.7 in");
    }

    #[tokio::test]
    async fn rejection_returns_to_idle_without_sending() {
        let mut o = orchestrator(200, b"%PDF");
        o.set_url("not a url");

        let err = o.submit().await.unwrap_err();
        assert!(matches!(err, WebPdfError::InvalidUrl { .. }));
        assert_eq!(o.phase(), SubmissionPhase::Idle);
        assert_eq!(o.status().severity, Severity::Error);
        assert!(o.transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn success_moves_to_ready() {
        let mut o = orchestrator(200, b"%PDF-1.7 body");
        o.set_url("https://example.org");

        let info = o.submit().await.unwrap();
        assert_eq!(info.size_bytes, 13);
        assert_eq!(o.phase(), SubmissionPhase::Ready);
        assert_eq!(o.status().message, MSG_CREATED);
        assert_eq!(o.live_references(), 1);

        let sent = o.transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url.as_deref(), Some("https://example.org/"));
    }

    #[tokio::test]
    async fn failure_moves_to_errored() {
        let mut o = orchestrator(500, b"renderer crashed");
        o.set_url("https://example.org");

        assert!(o.submit().await.is_err());
        assert_eq!(o.phase(), SubmissionPhase::Errored);
        assert_eq!(o.status().message, "Error: renderer crashed");
        assert!(o.artifact().is_none());
        assert!(o.can_submit());
    }

    #[tokio::test]
    async fn validation_failure_keeps_previous_artifact() {
        let mut o = orchestrator(200, b"%PDF");
        o.set_url("https://example.org");
        o.submit().await.unwrap();

        o.set_url("nope");
        assert!(o.submit().await.is_err());
        assert!(o.artifact().is_some());
        assert_eq!(o.live_references(), 1);
    }

    #[test]
    fn remove_image_by_index() {
        let mut o = orchestrator(200, b"%PDF");
        for name in ["a.png", "b.png"] {
            o.form_mut().images.push(UploadedImage {
                name: name.into(),
                mime: "image/png".into(),
                size: 1,
                data_uri: "data:image/png;base64,AA==".into(),
            });
        }
        assert_eq!(o.remove_image(0).unwrap().name, "a.png");
        assert!(o.remove_image(5).is_none());
        assert_eq!(o.form().images.len(), 1);
    }
}
