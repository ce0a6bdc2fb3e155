//! Image encoding: raw file bytes → self-contained `data:` URI.
//!
//! The snapshot service receives uploaded images inline in the JSON body, so
//! each file is wrapped exactly as a browser's `readAsDataURL` would wrap it:
//! `data:<mime>;base64,<payload>` with the standard (padded) alphabet.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// Encode `bytes` as a base64 data URI with the given MIME type.
pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    let b64 = STANDARD.encode(bytes);
    debug!("Encoded {} bytes → {} bytes base64", bytes.len(), b64.len());
    format!("data:{mime};base64,{b64}")
}
