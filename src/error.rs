//! Error types for the webpdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`WebPdfError`] — **Fatal for one operation**: the submission, print,
//!   share or download cannot proceed (bad URL, service rejected the request,
//!   empty PDF). None of them is fatal to the [`crate::Orchestrator`] itself;
//!   the form stays usable and the user may simply try again.
//!
//! * [`UploadRejection`] — **Non-fatal**: a single selected file was refused
//!   (wrong type, too large, unreadable) while every other file in the same
//!   batch is still accepted. Collected in [`crate::UploadBatch`].
//!
//! The `Display` text of every variant is the message shown to the user, so
//! [`crate::UiStatus::from_error`] can render any error without a lookup table.

use std::path::PathBuf;
use thiserror::Error;

/// All operation-level errors returned by the webpdf library.
///
/// Per-file upload failures use [`UploadRejection`] and are reported inside
/// [`crate::UploadBatch`] rather than propagated here.
#[derive(Debug, Error)]
pub enum WebPdfError {
    // ── Input validation ──────────────────────────────────────────────────
    /// The URL field is non-empty but not an absolute http/https URL.
    #[error("Invalid URL. Please enter a valid one.")]
    InvalidUrl { input: String, reason: String },

    /// Neither a usable URL nor any uploaded image was supplied.
    #[error("Please provide a URL or upload at least one image.")]
    MissingInput,

    // ── Transport ─────────────────────────────────────────────────────────
    /// Service answered HTTP 429.
    #[error("Error: too many requests. Please wait a moment and try again.")]
    RateLimited,

    /// Service answered HTTP 502; the renderer behind it is down.
    #[error("Error: the snapshot service is unavailable right now. Please try again later.")]
    UpstreamUnavailable,

    /// Service answered HTTP 413, usually too many or too large images.
    #[error("Error: the request is too large. Try fewer or smaller images.")]
    PayloadTooLarge,

    /// Any other non-success status; `body` is the raw response text.
    #[error("Error: {body}")]
    ServiceError { status: u16, body: String },

    /// The request never produced a response (DNS, TLS, connection reset…).
    #[error("Error: could not reach '{endpoint}': {reason}")]
    Transport { endpoint: String, reason: String },

    /// The request exceeded the configured client timeout.
    #[error("Error: the snapshot service did not answer within {secs}s")]
    RequestTimeout { endpoint: String, secs: u64 },

    /// Success status but a zero-byte body.
    #[error("Error: the snapshot service returned an empty PDF.")]
    EmptyArtifact,

    // ── Presentation ──────────────────────────────────────────────────────
    /// Print or share was requested before any PDF exists.
    #[error("{0}")]
    NoArtifact(&'static str),

    /// The print host refused to open a new viewer.
    #[error("Pop-up blocked. Please allow pop-ups.")]
    PopupBlocked { detail: String },

    /// The viewer opened but printing failed.
    #[error("Error printing: {0}")]
    PrintFailed(String),

    /// The share host cannot share files.
    #[error("Sharing not supported. Please download instead.")]
    ShareUnsupported,

    /// Sharing started but failed for a reason other than cancellation.
    #[error("Error sharing: {0}")]
    ShareFailed(String),

    // ── I/O ───────────────────────────────────────────────────────────────
    /// Could not create the temporary file backing an artifact.
    #[error("Failed to store the generated PDF: {0}")]
    ArtifactIo(#[source] std::io::Error),

    /// Could not write the downloaded PDF to its destination.
    #[error("Failed to write '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config ────────────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebPdfError {
    /// True for errors raised before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, WebPdfError::InvalidUrl { .. } | WebPdfError::MissingInput)
    }
}

/// A non-fatal refusal of a single selected file.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum UploadRejection {
    /// The file's MIME type is not `image/*`.
    #[error("'{name}' is not an image ({mime})")]
    NotAnImage { name: String, mime: String },

    /// The file exceeds the per-file ceiling.
    #[error("'{name}' is too large ({size} bytes, limit {limit} bytes)")]
    TooLarge { name: String, size: u64, limit: u64 },

    /// The file could not be read.
    #[error("'{name}' could not be read: {detail}")]
    ReadFailed { name: String, detail: String },
}

impl UploadRejection {
    /// Name of the refused file.
    pub fn name(&self) -> &str {
        match self {
            UploadRejection::NotAnImage { name, .. }
            | UploadRejection::TooLarge { name, .. }
            | UploadRejection::ReadFailed { name, .. } => name,
        }
    }
}
