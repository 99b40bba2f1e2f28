//! Pagination module
//!
//! A cursor-pagination engine that turns a page loader, a "next page"
//! trigger and a "start over" trigger into one growing list of items.
//!
//! # Overview
//!
//! - [`Paginator`] owns the listing state on a dedicated task. At most one
//!   load for the current listing is in flight; extra next-page triggers
//!   are dropped, not queued.
//! - Every restart bumps a generation counter. Loads carry the generation
//!   they were issued for and are discarded on completion if a restart has
//!   happened since.
//! - [`ConcatPolicy`] decides how a page joins the accumulated items
//!   (append, or de-duplicate by identity).
//!
//! ```rust,ignore
//! let paginator = Paginator::builder()
//!     .load_with(
//!         move |term: String| api.search(term),
//!         move |cursor: String| api.more(cursor),
//!     )
//!     .decode_with(
//!         |env: &SearchEnvelope| Ok(env.projects.clone()),
//!         |env: &SearchEnvelope| env.more_url.clone(),
//!     )
//!     .concat(ConcatPolicy::distinct_by(|p: &Project| p.id))
//!     .build()?;
//!
//! let mut items = paginator.items();
//! paginator.start_over_with("robots".to_string())?;
//! while let Some(projects) = items.next().await {
//!     render(&projects);
//! }
//! ```

mod concat;
mod machine;
mod paginator;
mod source;
mod types;

pub use concat::ConcatPolicy;
pub use machine::{Effect, Event, Reducer, Transition};
pub use paginator::{Paginator, PaginatorBuilder, DEFAULT_UPDATE_CAPACITY};
pub use source::{EnvelopeDecoder, FnDecoder, FnLoader, PageLoader};
pub use types::{Page, PageRequest, PaginationState, PaginatorSnapshot, PaginatorUpdate};
