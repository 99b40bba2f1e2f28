//! Loader types
//!
//! Declarative listing definition types for YAML parsing.

use crate::listing::TokenStyle;
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Listing Definition
// ============================================================================

/// Top-level listing definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListingDefinition {
    /// Listing name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Base URL for all requests
    pub base_url: String,
    /// Path of the first page, relative to the base URL
    pub path: String,
    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Query parameters sent with every first page
    #[serde(default)]
    pub params: HashMap<String, String>,
    /// Path to the items in a response; the whole response when absent
    #[serde(default)]
    pub items_path: Option<String>,
    /// Path to the continuation token; single-page listing when absent
    #[serde(default)]
    pub token_path: Option<String>,
    /// How the continuation token is followed
    #[serde(default)]
    pub token_style: TokenStyle,
    /// Extra condition that ends the listing
    #[serde(default)]
    pub stop_when: Option<StopConditionDefinition>,
    /// Drop accumulated items on restart (keep them until the new first
    /// page arrives when false)
    #[serde(default = "default_true")]
    pub clear_on_restart: bool,
    /// De-duplicate items by the value at this path
    #[serde(default)]
    pub dedup_path: Option<String>,
    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpDefinition,
}

fn default_true() -> bool {
    true
}

/// Condition that ends a listing besides a missing token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StopConditionDefinition {
    /// Stop when a page has no items
    EmptyPage,
    /// Stop when field equals value
    Field {
        /// JSON path to field
        path: String,
        /// Value to match
        value: serde_json::Value,
    },
}

// ============================================================================
// HTTP Definition
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HttpDefinition {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Maximum retries
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Backoff between retries
    #[serde(default)]
    pub backoff: BackoffType,
    /// First backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff ceiling in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// User agent
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpDefinition {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            backoff: BackoffType::default(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            user_agent: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    60_000
}
