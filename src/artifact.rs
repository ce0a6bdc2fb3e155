//! Generated PDFs and the lifetime of their on-disk references.
//!
//! A browser hands out object URLs for blobs and leaks them unless they are
//! revoked. Here the equivalent is an [`ArtifactHandle`]: a named temporary
//! file holding the PDF, which viewers, printers and share targets can open by
//! path. Releasing a handle is dropping it; the file is deleted and the
//! store's live count goes down on every exit path, including errors and
//! panics.

use crate::config::{Orientation, PageFormat};
use crate::error::WebPdfError;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::debug;

/// Creates [`ArtifactHandle`]s and counts how many are still alive.
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
    live: Arc<AtomicUsize>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `bytes` to a fresh temp file and return a live handle to it.
    pub fn create(&self, bytes: &[u8]) -> Result<ArtifactHandle, WebPdfError> {
        let mut file = tempfile::Builder::new()
            .prefix("webpdf-")
            .suffix(".pdf")
            .tempfile()
            .map_err(WebPdfError::ArtifactIo)?;
        file.write_all(bytes).map_err(WebPdfError::ArtifactIo)?;
        file.flush().map_err(WebPdfError::ArtifactIo)?;

        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Artifact reference created: {} ({} live)", file.path().display(), live);

        Ok(ArtifactHandle {
            file,
            live: Arc::clone(&self.live),
        })
    }

    /// Number of handles created by this store and not yet dropped.
    pub fn live_references(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// A live on-disk reference to PDF bytes. Dropping it releases the reference.
#[derive(Debug)]
pub struct ArtifactHandle {
    file: NamedTempFile,
    live: Arc<AtomicUsize>,
}

impl ArtifactHandle {
    /// Path a viewer, printer or share target can open.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl Drop for ArtifactHandle {
    fn drop(&mut self) {
        let left = self.live.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        debug!("Artifact reference released: {} ({} live)", self.file.path().display(), left);
    }
}

/// A successfully generated PDF.
#[derive(Debug)]
pub struct GeneratedArtifact {
    bytes: Vec<u8>,
    format: PageFormat,
    orientation: Orientation,
    created_at: DateTime<Local>,
    handle: ArtifactHandle,
}

impl GeneratedArtifact {
    pub fn new(
        bytes: Vec<u8>,
        format: PageFormat,
        orientation: Orientation,
        handle: ArtifactHandle,
    ) -> Self {
        Self {
            bytes,
            format,
            orientation,
            created_at: Local::now(),
            handle,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn format(&self) -> PageFormat {
        self.format
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    /// Path of the live reference backing this artifact (for preview).
    pub fn path(&self) -> &Path {
        self.handle.path()
    }

    /// `"A4 | portrait | 48.8 KB | 2025-01-31 14:05"`
    pub fn info_line(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.format,
            self.orientation,
            format_kib(self.size()),
            self.created_at.format("%Y-%m-%d %H:%M")
        )
    }

    /// Serializable snapshot of the metadata.
    pub fn info(&self) -> ArtifactInfo {
        ArtifactInfo {
            format: self.format,
            orientation: self.orientation,
            size_bytes: self.size(),
            created_at: self.created_at,
            path: self.path().to_path_buf(),
        }
    }
}

/// Metadata of a [`GeneratedArtifact`], detached from its bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactInfo {
    pub format: PageFormat,
    pub orientation: Orientation,
    pub size_bytes: usize,
    pub created_at: DateTime<Local>,
    pub path: PathBuf,
}

/// Size in KiB with one decimal, e.g. 50 000 bytes → `"48.8 KB"`.
pub fn format_kib(bytes: usize) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kib_formatting() {
        assert_eq!(format_kib(50_000), "48.8 KB");
        assert_eq!(format_kib(1024), "1.0 KB");
        assert_eq!(format_kib(0), "0.0 KB");
    }

    #[test]
    fn dropping_a_handle_releases_it() {
        let store = ArtifactStore::new();
        let handle = store.create(b"%PDF-1.4").unwrap();
        let path = handle.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");
        assert_eq!(store.live_references(), 1);

        drop(handle);
        assert!(!path.exists());
        assert_eq!(store.live_references(), 0);
    }

    #[test]
    fn clones_share_the_count() {
        let store = ArtifactStore::new();
        let other = store.clone();
        let _a = store.create(b"a").unwrap();
        let _b = other.create(b"b").unwrap();
        assert_eq!(store.live_references(), 2);
    }

    #[test]
    fn info_line_reports_format_orientation_size_and_date() {
        let store = ArtifactStore::new();
        let bytes = vec![0u8; 50_000];
        let handle = store.create(&bytes).unwrap();
        let artifact = GeneratedArtifact::new(bytes, PageFormat::A4, Orientation::Portrait, handle);

        let line = artifact.info_line();
        assert!(line.starts_with("A4 | portrait | 48.8 KB | "), "got: {line}");
        let date = line.rsplit(" | ").next().unwrap();
        assert!(
            chrono::NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M").is_ok(),
            "got: {date}"
        );

        let info = artifact.info();
        assert_eq!(info.size_bytes, 50_000);
        assert_eq!(info.path, artifact.path());
    }
}
