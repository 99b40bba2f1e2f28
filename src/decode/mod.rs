//! Response decoder module
//!
//! Turns JSON listing responses into pages.
//!
//! # Overview
//!
//! [`JsonEnvelopeDecoder`] implements the paginator's envelope decoder
//! contract for `serde_json::Value` responses: one path locates the items,
//! another the continuation token (a next-page URL or a cursor).

mod json;

pub use json::{extract_simple_path, identity_key, JsonEnvelopeDecoder, TypedJsonDecoder};
