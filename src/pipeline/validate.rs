//! Input validation: decide whether the form may be submitted.
//!
//! Validation is pure and synchronous so it can run both on submit and from
//! the debounced [`crate::debounce::UrlWatcher`] without duplicating rules.

use crate::config::PLACEHOLDER_URL;
use crate::error::WebPdfError;
use reqwest::Url;

/// Result of checking the URL field on its own.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UrlVerdict {
    /// Nothing typed (acceptable when images are supplied).
    #[default]
    Empty,
    /// Absolute http/https URL.
    Valid(Url),
    /// Anything else; carries the reason for logs.
    Invalid(String),
}

impl UrlVerdict {
    pub fn is_invalid(&self) -> bool {
        matches!(self, UrlVerdict::Invalid(_))
    }
}

/// Check a raw URL field value.
///
/// Surrounding whitespace is ignored. A value is valid only when it parses as
/// an absolute URL whose scheme begins with `http`.
pub fn check_url(input: &str) -> UrlVerdict {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return UrlVerdict::Empty;
    }
    match Url::parse(trimmed) {
        Ok(url) if url.scheme().starts_with("http") => UrlVerdict::Valid(url),
        Ok(url) => UrlVerdict::Invalid(format!("unsupported scheme '{}'", url.scheme())),
        Err(e) => UrlVerdict::Invalid(e.to_string()),
    }
}

/// True when `input` is the pre-filled value (after URL normalisation).
pub fn is_placeholder(input: &str) -> bool {
    matches!(check_url(input), UrlVerdict::Valid(url) if is_placeholder_url(&url))
}

fn is_placeholder_url(url: &Url) -> bool {
    url.as_str() == PLACEHOLDER_URL
}

/// Resolve the URL to send, enforcing the "URL or images" rule.
///
/// Returns `Ok(None)` when only images will be sent, `Ok(Some(url))` when a
/// real target URL was typed.
pub fn resolve_target(input: &str, image_count: usize) -> Result<Option<Url>, WebPdfError> {
    let target = match check_url(input) {
        UrlVerdict::Invalid(reason) => {
            return Err(WebPdfError::InvalidUrl {
                input: input.to_string(),
                reason,
            })
        }
        UrlVerdict::Empty => None,
        UrlVerdict::Valid(url) if is_placeholder_url(&url) => None,
        UrlVerdict::Valid(url) => Some(url),
    };

    if target.is_none() && image_count == 0 {
        return Err(WebPdfError::MissingInput);
    }
    Ok(target)
}
