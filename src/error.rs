//! Error types for Solidafy Pager
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! The paginator itself never fails a listing because of a load error; it
//! collapses every failure into "the load did not produce data". The kinds
//! below exist for loaders and callers that want to tell them apart.

use thiserror::Error;

/// The main error type for Solidafy Pager
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Envelope Decoding Errors
    // ============================================================================
    #[error("JSONPath error: {message}")]
    JsonPath { message: String },

    #[error("Failed to extract items from path '{path}': {message}")]
    ItemExtraction { path: String, message: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // Paginator Errors
    // ============================================================================
    #[error("Paginator has shut down")]
    PaginatorClosed,

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Coarse classification of a failed page load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFailureKind {
    /// Transport failed: connection, timeout, retries exhausted
    Network,
    /// The response arrived but could not be turned into a page
    Decode,
    /// The server answered with an error status
    Server(u16),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a JSONPath error
    pub fn json_path(message: impl Into<String>) -> Self {
        Self::JsonPath {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an item extraction error
    pub fn item_extraction(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ItemExtraction {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }

    /// Classify this error as a page load failure
    ///
    /// Returns `None` for errors that cannot come out of a page load
    /// (configuration, CLI I/O, a closed paginator).
    pub fn load_failure_kind(&self) -> Option<LoadFailureKind> {
        match self {
            Error::HttpStatus { status, .. } => Some(LoadFailureKind::Server(*status)),
            Error::Http(e) => match e.status() {
                Some(status) => Some(LoadFailureKind::Server(status.as_u16())),
                None if e.is_decode() => Some(LoadFailureKind::Decode),
                None => Some(LoadFailureKind::Network),
            },
            Error::Timeout { .. } | Error::MaxRetriesExceeded { .. } | Error::InvalidUrl(_) => {
                Some(LoadFailureKind::Network)
            }
            Error::JsonPath { .. }
            | Error::ItemExtraction { .. }
            | Error::Decode { .. } => Some(LoadFailureKind::Decode),
            Error::Other(_) | Error::Anyhow(_) => Some(LoadFailureKind::Network),
            _ => None,
        }
    }
}

/// Check if an HTTP status code is retryable
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for Solidafy Pager
pub type Result<T> = std::result::Result<T, Error>;
