//! Configuration types for snapshot requests.
//!
//! Two structs split what the user edits from how the client behaves:
//!
//! * [`RenderOptions`] — the per-submission knobs shown on the form (page
//!   format, orientation, wait time, rendering flags).
//! * [`SnapshotConfig`] — client behaviour (endpoint, timeouts, progress and
//!   debounce cadence), built via [`SnapshotConfigBuilder`].

use crate::error::WebPdfError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Snapshot service used when no endpoint is configured.
pub const DEFAULT_ENDPOINT: &str = "https://snapshot.jessejesse.workers.dev";

/// Value pre-filled in the URL field. Treated as "no URL" on submission.
pub const PLACEHOLDER_URL: &str = "https://example.com/";

/// Upper bound for [`RenderOptions::wait_ms`].
pub const MAX_WAIT_MS: u32 = 10_000;

/// Per-file ceiling for uploaded images (10 MB).
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Margin applied on every side of every page.
pub const PAGE_MARGIN: &str = "1cm";

/// Suggested file name for downloads and shares.
pub const DOWNLOAD_FILENAME: &str = "webPDF.pdf";

// ── Render options ───────────────────────────────────────────────────────

/// Options the user picks for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Paper size. Default: A4.
    pub format: PageFormat,

    /// Page orientation. Default: portrait.
    pub orientation: Orientation,

    /// How long the service waits after page load before rendering, in
    /// milliseconds. Range: 0–10000. Default: 2000.
    pub wait_ms: u32,

    /// Render CSS backgrounds. Default: true.
    pub print_background: bool,

    /// Render the browser header/footer (date and URL). Default: false.
    pub display_header_footer: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: PageFormat::default(),
            orientation: Orientation::default(),
            wait_ms: 2000,
            print_background: true,
            display_header_footer: false,
        }
    }
}

impl RenderOptions {
    /// Set the wait time, clamped to `0..=MAX_WAIT_MS`.
    pub fn set_wait_ms(&mut self, ms: u32) {
        self.wait_ms = ms.min(MAX_WAIT_MS);
    }

    /// Physical size hint for the current format and orientation.
    pub fn size_hint(&self) -> String {
        self.format.size_hint(self.orientation)
    }
}

// ── Client config ────────────────────────────────────────────────────────

/// Client behaviour for talking to the snapshot service.
///
/// Built via [`SnapshotConfig::builder()`] or [`SnapshotConfig::default()`].
///
/// # Example
/// ```rust
/// use webpdf::SnapshotConfig;
///
/// let config = SnapshotConfig::builder()
///     .endpoint("http://127.0.0.1:8787")
///     .request_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.endpoint, "http://127.0.0.1:8787");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// POST target. Default: [`DEFAULT_ENDPOINT`].
    pub endpoint: String,

    /// Whole-request timeout in seconds. Default: 120.
    ///
    /// Rendering a heavy page plus `wait_ms` regularly takes tens of seconds.
    pub request_timeout_secs: u64,

    /// Interval between simulated progress steps. Default: 500 ms.
    pub progress_tick_ms: u64,

    /// Percentage added on each tick. Default: 10.
    pub progress_step: u8,

    /// Highest percentage reached before the response arrives. Default: 90.
    pub progress_cap: u8,

    /// Quiet period before an edited URL is re-validated. Default: 400 ms.
    pub debounce_ms: u64,

    /// Number of image files read at the same time. Default: 4.
    pub upload_concurrency: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: 120,
            progress_tick_ms: 500,
            progress_step: 10,
            progress_cap: 90,
            debounce_ms: 400,
            upload_concurrency: 4,
        }
    }
}

impl SnapshotConfig {
    /// Create a new builder for `SnapshotConfig`.
    pub fn builder() -> SnapshotConfigBuilder {
        SnapshotConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SnapshotConfig`].
#[derive(Debug)]
pub struct SnapshotConfigBuilder {
    config: SnapshotConfig,
}

impl SnapshotConfigBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn progress_tick_ms(mut self, ms: u64) -> Self {
        self.config.progress_tick_ms = ms.max(1);
        self
    }

    pub fn progress_step(mut self, step: u8) -> Self {
        self.config.progress_step = step.max(1);
        self
    }

    pub fn progress_cap(mut self, cap: u8) -> Self {
        self.config.progress_cap = cap.min(99);
        self
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.config.debounce_ms = ms;
        self
    }

    pub fn upload_concurrency(mut self, n: usize) -> Self {
        self.config.upload_concurrency = n.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SnapshotConfig, WebPdfError> {
        let c = &self.config;
        match reqwest::Url::parse(&c.endpoint) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            _ => {
                return Err(WebPdfError::InvalidConfig(format!(
                    "endpoint must be an absolute http(s) URL, got '{}'",
                    c.endpoint
                )))
            }
        }
        if c.request_timeout_secs == 0 {
            return Err(WebPdfError::InvalidConfig(
                "request timeout must be ≥ 1s".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Named paper sizes understood by the snapshot service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PageFormat {
    Letter,
    Legal,
    Tabloid,
    A0,
    A1,
    A2,
    A3,
    #[default]
    A4,
    A5,
    A6,
}

impl PageFormat {
    /// Every format, in the order a picker lists them.
    pub const ALL: [PageFormat; 10] = [
        PageFormat::Letter,
        PageFormat::Legal,
        PageFormat::Tabloid,
        PageFormat::A0,
        PageFormat::A1,
        PageFormat::A2,
        PageFormat::A3,
        PageFormat::A4,
        PageFormat::A5,
        PageFormat::A6,
    ];

    /// Name sent on the wire (`pdfOptions.format`).
    pub fn as_str(self) -> &'static str {
        match self {
            PageFormat::Letter => "Letter",
            PageFormat::Legal => "Legal",
            PageFormat::Tabloid => "Tabloid",
            PageFormat::A0 => "A0",
            PageFormat::A1 => "A1",
            PageFormat::A2 => "A2",
            PageFormat::A3 => "A3",
            PageFormat::A4 => "A4",
            PageFormat::A5 => "A5",
            PageFormat::A6 => "A6",
        }
    }

    /// Portrait `(width, height)` in inches, rounded to one decimal.
    pub fn dimensions_in(self) -> (f32, f32) {
        match self {
            PageFormat::Letter => (8.5, 11.0),
            PageFormat::Legal => (8.5, 14.0),
            PageFormat::Tabloid => (11.0, 17.0),
            PageFormat::A0 => (33.1, 46.8),
            PageFormat::A1 => (23.4, 33.1),
            PageFormat::A2 => (16.5, 23.4),
            PageFormat::A3 => (11.7, 16.5),
            PageFormat::A4 => (8.3, 11.7),
            PageFormat::A5 => (5.8, 8.3),
            PageFormat::A6 => (4.1, 5.8),
        }
    }

    /// Human-readable size, e.g. `"8.3 × 11.7 in"`; swapped for landscape.
    pub fn size_hint(self, orientation: Orientation) -> String {
        let (w, h) = self.dimensions_in();
        let (w, h) = match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        };
        format!("{w:.1} × {h:.1} in")
    }
}

impl fmt::Display for PageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageFormat {
    type Err = WebPdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageFormat::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| WebPdfError::InvalidConfig(format!("unknown page format '{s}'")))
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn is_landscape(self) -> bool {
        self == Orientation::Landscape
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        })
    }
}

impl FromStr for Orientation {
    type Err = WebPdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            other => Err(WebPdfError::InvalidConfig(format!(
                "unknown orientation '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_form() {
        let o = RenderOptions::default();
        assert_eq!(o.format, PageFormat::A4);
        assert_eq!(o.orientation, Orientation::Portrait);
        assert_eq!(o.wait_ms, 2000);
        assert!(o.print_background);
        assert!(!o.display_header_footer);
    }

    #[test]
    fn wait_is_clamped() {
        let mut o = RenderOptions::default();
        o.set_wait_ms(25_000);
        assert_eq!(o.wait_ms, MAX_WAIT_MS);
        o.set_wait_ms(0);
        assert_eq!(o.wait_ms, 0);
    }

    #[test]
    fn size_hint_swaps_for_landscape() {
        assert_eq!(PageFormat::A4.size_hint(Orientation::Portrait), "8.3 × 11.7 in");
        assert_eq!(PageFormat::A4.size_hint(Orientation::Landscape), "11.7 × 8.3 in");
        assert_eq!(PageFormat::Letter.size_hint(Orientation::Portrait), "8.5 × 11.0 in");
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("a4".parse::<PageFormat>().unwrap(), PageFormat::A4);
        assert_eq!("TABLOID".parse::<PageFormat>().unwrap(), PageFormat::Tabloid);
        assert!("B5".parse::<PageFormat>().is_err());
        assert_eq!(PageFormat::ALL.len(), 10);
    }

    #[test]
    fn orientation_round_trips_through_display() {
        for o in [Orientation::Portrait, Orientation::Landscape] {
            assert_eq!(o.to_string().parse::<Orientation>().unwrap(), o);
        }
    }

    #[test]
    fn builder_rejects_non_http_endpoint() {
        let err = SnapshotConfig::builder()
            .endpoint("ftp://example.org")
            .build()
            .unwrap_err();
        assert!(matches!(err, WebPdfError::InvalidConfig(_)));
    }

    #[test]
    fn builder_clamps_progress_cap() {
        let c = SnapshotConfig::builder().progress_cap(250).build().unwrap();
        assert_eq!(c.progress_cap, 99);
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        assert!(SnapshotConfig::builder()
            .request_timeout_secs(0)
            .build()
            .is_err());
    }
}
