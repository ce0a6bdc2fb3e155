//! Upload intake: turn user-selected files into inline images.
//!
//! Every candidate is checked independently. A refused file becomes an
//! [`UploadRejection`] in the batch report and never blocks the rest of the
//! batch. Reads run concurrently and accepted images are appended in the
//! order the reads finish, which need not match selection order.

use crate::config::MAX_IMAGE_BYTES;
use crate::error::UploadRejection;
use crate::pipeline::encode;
use futures::stream::{self, StreamExt};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// MIME type used when nothing better is known.
const UNKNOWN_MIME: &str = "application/octet-stream";

/// An image ready to be sent inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    /// Original file name (for display and logs).
    pub name: String,
    /// `image/*` MIME type.
    pub mime: String,
    /// Size of the raw file in bytes.
    pub size: u64,
    /// `data:<mime>;base64,…`
    pub data_uri: String,
}

/// A file the user selected, before any checks.
#[derive(Debug, Clone)]
pub struct ImageCandidate {
    name: String,
    declared_mime: Option<String>,
    source: CandidateSource,
}

#[derive(Debug, Clone)]
enum CandidateSource {
    Path(PathBuf),
    Memory(Vec<u8>),
}

impl ImageCandidate {
    /// A file on disk. The MIME type is taken from the extension, falling
    /// back to sniffing the first bytes once the file is read.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            declared_mime: mime_from_extension(&path).map(str::to_string),
            source: CandidateSource::Path(path),
        }
    }

    /// Bytes already in memory with the MIME type their origin declared.
    pub fn from_bytes(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            declared_mime: Some(mime.into()),
            source: CandidateSource::Memory(bytes),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Outcome of one intake run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadBatch {
    /// Accepted images, in completion order.
    pub accepted: Vec<UploadedImage>,
    /// One entry per refused file.
    pub rejected: Vec<UploadRejection>,
}

/// Check and encode every candidate, reading up to `concurrency` files at once.
pub async fn load_images(candidates: Vec<ImageCandidate>, concurrency: usize) -> UploadBatch {
    let total = candidates.len();
    let mut batch = UploadBatch::default();

    let mut results = stream::iter(candidates.into_iter().map(load_one))
        .buffer_unordered(concurrency.max(1));

    while let Some(result) = results.next().await {
        match result {
            Ok(image) => {
                debug!("Accepted '{}' ({} bytes, {})", image.name, image.size, image.mime);
                batch.accepted.push(image);
            }
            Err(rejection) => {
                warn!("Upload rejected: {}", rejection);
                batch.rejected.push(rejection);
            }
        }
    }

    info!(
        "Image intake: {}/{} accepted, {} rejected",
        batch.accepted.len(),
        total,
        batch.rejected.len()
    );
    batch
}

/// Check a single candidate.
///
/// Size is checked before the file is read so an oversized file is never
/// pulled into memory.
async fn load_one(candidate: ImageCandidate) -> Result<UploadedImage, UploadRejection> {
    let ImageCandidate {
        name,
        declared_mime,
        source,
    } = candidate;

    let read_failed = |e: std::io::Error| UploadRejection::ReadFailed {
        name: name.clone(),
        detail: e.to_string(),
    };

    let bytes = match source {
        CandidateSource::Path(path) => {
            let meta = tokio::fs::metadata(&path).await.map_err(read_failed)?;
            check_size(&name, meta.len())?;
            if let Some(mime) = declared_mime.as_deref() {
                check_mime(&name, mime)?;
            }
            tokio::fs::read(&path).await.map_err(read_failed)?
        }
        CandidateSource::Memory(bytes) => {
            check_size(&name, bytes.len() as u64)?;
            bytes
        }
    };

    let mime = match declared_mime {
        Some(m) => m,
        None => sniff_mime(&bytes).unwrap_or(UNKNOWN_MIME).to_string(),
    };
    check_mime(&name, &mime)?;

    Ok(UploadedImage {
        data_uri: encode::to_data_uri(&mime, &bytes),
        size: bytes.len() as u64,
        name,
        mime,
    })
}

fn check_size(name: &str, size: u64) -> Result<(), UploadRejection> {
    if size > MAX_IMAGE_BYTES {
        return Err(UploadRejection::TooLarge {
            name: name.to_string(),
            size,
            limit: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

fn check_mime(name: &str, mime: &str) -> Result<(), UploadRejection> {
    if !mime.starts_with("image/") {
        return Err(UploadRejection::NotAnImage {
            name: name.to_string(),
            mime: mime.to_string(),
        });
    }
    Ok(())
}

/// MIME type implied by the file extension, if it is a known image format.
fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if ext == "svg" {
        return Some("image/svg+xml");
    }
    ImageFormat::from_extension(&ext).map(|f| f.to_mime_type())
}

/// MIME type implied by the magic bytes, if they match a known image format.
fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes).ok().map(|f| f.to_mime_type())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn extension_drives_mime() {
        assert_eq!(mime_from_extension(Path::new("a.PNG")), Some("image/png"));
        assert_eq!(mime_from_extension(Path::new("b.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_from_extension(Path::new("c.svg")), Some("image/svg+xml"));
        assert_eq!(mime_from_extension(Path::new("notes.txt")), None);
        assert_eq!(mime_from_extension(Path::new("noext")), None);
    }

    #[test]
    fn sniffing_recognises_png() {
        assert_eq!(sniff_mime(PNG_MAGIC), Some("image/png"));
        assert_eq!(sniff_mime(b"hello world"), None);
    }

    #[tokio::test]
    async fn bad_files_do_not_block_the_batch() {
        let candidates = vec![
            ImageCandidate::from_bytes("ok.png", "image/png", PNG_MAGIC.to_vec()),
            ImageCandidate::from_bytes("notes.txt", "text/plain", b"hi".to_vec()),
            ImageCandidate::from_bytes(
                "huge.png",
                "image/png",
                vec![0u8; (MAX_IMAGE_BYTES + 1) as usize],
            ),
        ];

        let batch = load_images(candidates, 2).await;

        assert_eq!(batch.accepted.len(), 1);
        assert_eq!(batch.accepted[0].name, "ok.png");
        assert!(batch.accepted[0].data_uri.starts_with("data:image/png;base64,"));

        assert_eq!(batch.rejected.len(), 2);
        assert!(batch
            .rejected
            .iter()
            .any(|r| matches!(r, UploadRejection::NotAnImage { name, .. } if name == "notes.txt")));
        assert!(batch
            .rejected
            .iter()
            .any(|r| matches!(r, UploadRejection::TooLarge { name, .. } if name == "huge.png")));
    }

    #[tokio::test]
    async fn exactly_ten_megabytes_is_accepted() {
        let batch = load_images(
            vec![ImageCandidate::from_bytes(
                "edge.png",
                "image/png",
                vec![0u8; MAX_IMAGE_BYTES as usize],
            )],
            1,
        )
        .await;
        assert_eq!(batch.accepted.len(), 1);
        assert!(batch.rejected.is_empty());
    }

    #[tokio::test]
    async fn reads_files_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("photo.png");
        std::fs::File::create(&png).unwrap().write_all(PNG_MAGIC).unwrap();

        // No extension: falls back to sniffing.
        let sniffed = dir.path().join("scan");
        std::fs::write(&sniffed, PNG_MAGIC).unwrap();

        let text = dir.path().join("readme.md");
        std::fs::write(&text, "# hi").unwrap();

        let missing = dir.path().join("gone.png");

        let batch = load_images(
            vec![
                ImageCandidate::from_path(&png),
                ImageCandidate::from_path(&sniffed),
                ImageCandidate::from_path(&text),
                ImageCandidate::from_path(&missing),
            ],
            4,
        )
        .await;

        let mut names: Vec<_> = batch.accepted.iter().map(|i| i.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["photo.png", "scan"]);
        assert!(batch.accepted.iter().all(|i| i.mime == "image/png"));
        assert!(batch.accepted.iter().all(|i| i.size == PNG_MAGIC.len() as u64));

        assert_eq!(batch.rejected.len(), 2);
        assert!(batch
            .rejected
            .iter()
            .any(|r| matches!(r, UploadRejection::NotAnImage { name, mime } if name == "readme.md" && mime == UNKNOWN_MIME)));
        assert!(batch
            .rejected
            .iter()
            .any(|r| matches!(r, UploadRejection::ReadFailed { name, .. } if name == "gone.png")));
    }
}
