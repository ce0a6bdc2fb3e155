//! Pipeline stages for turning form input into a PDF.
//!
//! Each submodule implements exactly one step, so each is independently
//! testable and the transport can be swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! validate ──▶ upload ──▶ encode ──▶ request ──▶ transport
//! (URL rules)  (files)    (data URI) (JSON body) (POST + status mapping)
//! ```
//!
//! 1. [`validate`]  — URL shape and the "URL or images" rule
//! 2. [`upload`]    — type/size checks and concurrent file reads
//! 3. [`encode`]    — wrap raw bytes as `data:` URIs
//! 4. [`request`]   — the serde payload sent to the service
//! 5. [`transport`] — the only stage with network I/O; classifies responses

pub mod encode;
pub mod request;
pub mod transport;
pub mod upload;
pub mod validate;
