//! HTTP client module
//!
//! Provides the HTTP client with retry and backoff strategies.
//!
//! # Features
//!
//! - **Automatic Retries**: Configurable retry logic with backoff
//! - **Backoff Strategies**: Constant, linear, and exponential backoff
//! - **Retry-After**: 429 responses wait as long as the server asks,
//!   capped at the maximum backoff

mod client;

pub use client::{HttpClient, HttpClientConfig};
