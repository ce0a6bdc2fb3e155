//! Wire payload for the snapshot service.
//!
//! ```json
//! {
//!   "url": "https://example.org/",
//!   "waitForTimeout": 2000,
//!   "pdfOptions": {
//!     "format": "A4",
//!     "landscape": false,
//!     "printBackground": true,
//!     "displayHeaderFooter": false,
//!     "margin": { "top": "1cm", "right": "1cm", "bottom": "1cm", "left": "1cm" }
//!   },
//!   "images": ["data:image/png;base64,…"]
//! }
//! ```

use crate::config::{PageFormat, RenderOptions, PAGE_MARGIN};
use crate::pipeline::upload::UploadedImage;
use serde::{Deserialize, Serialize};

/// Body of the POST request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRequest {
    /// Target page; omitted when only images are sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub wait_for_timeout: u32,
    pub pdf_options: PdfOptions,
    pub images: Vec<String>,
}

/// Rendering options forwarded to the service's PDF printer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfOptions {
    pub format: PageFormat,
    pub landscape: bool,
    pub print_background: bool,
    pub display_header_footer: bool,
    pub margin: Margin,
}

/// Page margins as CSS lengths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margin {
    pub top: String,
    pub right: String,
    pub bottom: String,
    pub left: String,
}

impl Margin {
    /// The same length on all four sides.
    pub fn uniform(len: &str) -> Self {
        Self {
            top: len.to_string(),
            right: len.to_string(),
            bottom: len.to_string(),
            left: len.to_string(),
        }
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::uniform(PAGE_MARGIN)
    }
}

impl SnapshotRequest {
    /// Assemble a request from validated form values.
    pub fn new(url: Option<String>, options: &RenderOptions, images: &[UploadedImage]) -> Self {
        Self {
            url,
            wait_for_timeout: options.wait_ms,
            pdf_options: PdfOptions {
                format: options.format,
                landscape: options.orientation.is_landscape(),
                print_background: options.print_background,
                display_header_footer: options.display_header_footer,
                margin: Margin::default(),
            },
            images: images.iter().map(|i| i.data_uri.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Orientation;
    use serde_json::json;

    fn image(uri: &str) -> UploadedImage {
        UploadedImage {
            name: "a.png".into(),
            mime: "image/png".into(),
            size: 1,
            data_uri: uri.into(),
        }
    }

    #[test]
    fn serialises_to_service_shape() {
        let mut options = RenderOptions::default();
        options.orientation = Orientation::Landscape;
        options.format = PageFormat::Letter;
        options.display_header_footer = true;

        let req = SnapshotRequest::new(
            Some("https://example.org/".into()),
            &options,
            &[image("data:image/png;base64,AAAA")],
        );

        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "url": "https://example.org/",
                "waitForTimeout": 2000,
                "pdfOptions": {
                    "format": "Letter",
                    "landscape": true,
                    "printBackground": true,
                    "displayHeaderFooter": true,
                    "margin": { "top": "1cm", "right": "1cm", "bottom": "1cm", "left": "1cm" }
                },
                "images": ["data:image/png;base64,AAAA"]
            })
        );
    }

    #[test]
    fn url_is_omitted_when_absent() {
        let req = SnapshotRequest::new(None, &RenderOptions::default(), &[image("data:x")]);
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("url").is_none());
        assert_eq!(value["images"].as_array().unwrap().len(), 1);
    }
}
