//! Network stage: send one [`SnapshotRequest`] and classify the answer.
//!
//! The orchestrator only sees the [`SnapshotTransport`] trait, so tests (and
//! embedders with their own HTTP stack) can swap the reqwest-backed
//! [`HttpTransport`] for anything that returns a status and a body.
//!
//! No retries: a failed attempt is reported and the user resubmits.

use crate::config::SnapshotConfig;
use crate::error::WebPdfError;
use crate::pipeline::request::SnapshotRequest;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Raw answer from the snapshot service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Anything able to deliver a request to the snapshot service.
pub trait SnapshotTransport: Send + Sync {
    /// Send `request` and return the raw response.
    ///
    /// Implementations return `Err` only when no response was received at
    /// all; HTTP error statuses are classified by [`interpret_response`].
    fn send(
        &self,
        request: &SnapshotRequest,
    ) -> impl Future<Output = Result<SnapshotResponse, WebPdfError>> + Send;
}

/// reqwest-backed transport posting JSON to the configured endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    timeout_secs: u64,
}

impl HttpTransport {
    pub fn new(config: &SnapshotConfig) -> Result<Self, WebPdfError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("webpdf/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WebPdfError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_reqwest(&self, e: reqwest::Error) -> WebPdfError {
        if e.is_timeout() {
            WebPdfError::RequestTimeout {
                endpoint: self.endpoint.clone(),
                secs: self.timeout_secs,
            }
        } else {
            WebPdfError::Transport {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            }
        }
    }
}

impl SnapshotTransport for HttpTransport {
    async fn send(&self, request: &SnapshotRequest) -> Result<SnapshotResponse, WebPdfError> {
        let start = Instant::now();
        info!(
            "POST {} (url: {}, images: {})",
            self.endpoint,
            request.url.as_deref().unwrap_or("-"),
            request.images.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_reqwest(e))?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| self.map_reqwest(e))?;

        debug!(
            "HTTP {} with {} bytes in {}ms",
            status,
            body.len(),
            start.elapsed().as_millis()
        );

        Ok(SnapshotResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Classify a raw response into PDF bytes or a user-facing error.
///
/// | Status      | Result                          |
/// |-------------|---------------------------------|
/// | 2xx, body   | `Ok(body)`                      |
/// | 2xx, empty  | [`WebPdfError::EmptyArtifact`]  |
/// | 429         | [`WebPdfError::RateLimited`]    |
/// | 502         | [`WebPdfError::UpstreamUnavailable`] |
/// | 413         | [`WebPdfError::PayloadTooLarge`] |
/// | other       | [`WebPdfError::ServiceError`] with the raw body text |
pub fn interpret_response(response: SnapshotResponse) -> Result<Vec<u8>, WebPdfError> {
    let SnapshotResponse { status, body } = response;

    if (200..300).contains(&status) {
        if body.is_empty() {
            warn!("HTTP {} with an empty body", status);
            return Err(WebPdfError::EmptyArtifact);
        }
        return Ok(body);
    }

    warn!("Snapshot service answered HTTP {}", status);
    Err(match status {
        429 => WebPdfError::RateLimited,
        502 => WebPdfError::UpstreamUnavailable,
        413 => WebPdfError::PayloadTooLarge,
        _ => {
            let text = String::from_utf8_lossy(&body).trim().to_string();
            WebPdfError::ServiceError {
                status,
                body: if text.is_empty() {
                    format!("HTTP {status}")
                } else {
                    text
                },
            }
        }
    })
}
