//! # webpdf
//!
//! Turn a web page, or a handful of images, into a PDF through a remote
//! snapshot service, and manage the result: preview path, download, print
//! and share.
//!
//! The rendering itself happens elsewhere. This crate owns the client side:
//! validating input, encoding uploads, sending one request, interpreting the
//! answer, and making sure exactly one generated PDF is held at a time.
//!
//! ## Flow Overview
//!
//! ```text
//! form
//!  │
//!  ├─ 1. Validate  URL must be absolute http(s); URL or images required
//!  ├─ 2. Upload    image/* only, ≤ 10 MB each, read concurrently
//!  ├─ 3. Encode    bytes → data:<mime>;base64,…
//!  ├─ 4. Submit    one JSON POST, simulated progress while waiting
//!  ├─ 5. Classify  429 / 502 / 413 / other / empty body
//!  └─ 6. Artifact  temp-file reference, released before the next one
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use webpdf::{Orchestrator, PageFormat, SnapshotConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = Orchestrator::from_config(SnapshotConfig::default())?;
//!     session.set_url("https://www.rust-lang.org");
//!     session.options_mut().format = PageFormat::Letter;
//!
//!     let info = session.submit().await?;
//!     eprintln!("{}", session.info_line().unwrap_or_default());
//!     session.download("site.pdf").await?;
//!     eprintln!("{} bytes", info.size_bytes);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `webpdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! webpdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod artifact;
pub mod config;
pub mod debounce;
pub mod error;
pub mod orchestrator;
pub mod pipeline;
pub mod present;
pub mod progress;
pub mod status;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use artifact::{format_kib, ArtifactHandle, ArtifactInfo, ArtifactStore, GeneratedArtifact};
pub use config::{
    Orientation, PageFormat, RenderOptions, SnapshotConfig, SnapshotConfigBuilder,
    DEFAULT_ENDPOINT, DOWNLOAD_FILENAME, MAX_IMAGE_BYTES, MAX_WAIT_MS, PLACEHOLDER_URL,
};
pub use debounce::UrlWatcher;
pub use error::{UploadRejection, WebPdfError};
pub use orchestrator::{FormState, Orchestrator, ShareOutcome, SubmissionPhase};
pub use pipeline::request::SnapshotRequest;
pub use pipeline::transport::{interpret_response, HttpTransport, SnapshotResponse, SnapshotTransport};
pub use pipeline::upload::{ImageCandidate, UploadBatch, UploadedImage};
pub use pipeline::validate::{check_url, UrlVerdict};
pub use present::{
    CommandPrintHost, PrintError, PrintHost, ShareError, ShareHost, SharedFile,
    UnsupportedShareHost,
};
pub use progress::{NoopProgressCallback, ProgressCallback, ProgressTicker, SubmissionProgressCallback};
pub use status::{Severity, UiStatus};
