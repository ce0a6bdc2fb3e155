//! User-facing status line.
//!
//! Every message the user can see lives here or in the `Display` impls of
//! [`crate::error`], so wording changes touch exactly one place.

use crate::error::WebPdfError;
use serde::{Deserialize, Serialize};

pub const MSG_CREATED: &str = "PDF created successfully!";
pub const MSG_SHARED: &str = "PDF shared successfully!";
pub const MSG_NO_PDF_TO_PRINT: &str = "No PDF available to print.";
pub const MSG_NO_PDF_TO_SHARE: &str = "No PDF to share.";
pub const MSG_NO_PDF_TO_DOWNLOAD: &str = "No PDF available to download.";

/// Title and text attached to shared files.
pub const SHARE_TITLE: &str = "Web PDF";
pub const SHARE_TEXT: &str = "Powered by JesseJesse.com";

/// Colour class of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Neutral,
    Success,
    Error,
}

/// Outcome of the last operation, as shown under the submit control.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UiStatus {
    pub message: String,
    pub severity: Severity,
}

impl UiStatus {
    pub fn neutral(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Neutral,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn from_error(err: &WebPdfError) -> Self {
        Self::error(err.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.message.is_empty()
    }
}
