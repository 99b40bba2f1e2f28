// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Solidafy Pager
//!
//! A cursor pagination engine for async Rust. Give it a way to load the
//! first page of a listing, a way to load the next page from a
//! continuation token, and two triggers ("next page", "start over"); it
//! keeps one growing list of items plus "is fetching" and "loading page"
//! signals.
//!
//! ## Features
//!
//! - **Single flight**: at most one page request in flight per listing;
//!   next-page triggers during a load are dropped
//! - **Generation-based restarts**: results of a superseded listing are
//!   discarded on arrival
//! - **Pluggable concatenation**: append, or de-duplicate by identity
//! - **HTTP listings from YAML**: next-URL and cursor-parameter APIs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use solidafy_pager::{load_listing, Result};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let listing = load_listing("discover.yaml")?;
//!     let paginator = listing.paginator()?;
//!
//!     let mut items = Box::pin(paginator.items());
//!     paginator.start_over_with([("term".into(), "robots".into())].into())?;
//!
//!     while let Some(projects) = items.next().await {
//!         println!("{} projects", projects.len());
//!         paginator.next_page()?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! start over ──┐                       ┌──► items (Arc<Vec<I>>)
//! next page ───┼──► paginator task ────┼──► fetching (bool)
//! completions ─┘    (reducer + state)  └──► loading page (u32)
//!                         │
//!                         ▼
//!              PageLoader ─► EnvelopeDecoder ─► ConcatPolicy
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Pagination engine
pub mod pagination;

/// JSON envelope decoders
pub mod decode;

/// HTTP client with retry
pub mod http;

/// HTTP listing page loader
pub mod listing;

/// YAML loader for listing definitions
pub mod loader;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, LoadFailureKind, Result};
pub use types::*;

// Re-export commonly used types
pub use decode::JsonEnvelopeDecoder;
pub use listing::{HttpListingLoader, ListingDecoder, ListingResponse, TokenStyle};
pub use loader::{load_listing, load_listing_from_str, JsonPaginator, ListingDefinition};
pub use pagination::{
    ConcatPolicy, EnvelopeDecoder, PageLoader, Paginator, PaginatorBuilder, PaginatorSnapshot,
    PaginatorUpdate,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
