//! HTTP listing module
//!
//! [`HttpListingLoader`] plugs a JSON listing endpoint into the paginator.
//! Pair it with a [`ListingDecoder`] wrapping a
//! [`crate::decode::JsonEnvelopeDecoder`] that knows where the items and
//! the continuation token live.

mod http;

pub use http::{HttpListingLoader, ListingDecoder, ListingResponse, TokenStyle};
