//! YAML Loader module
//!
//! Parse listing definitions from YAML files.
//!
//! # Overview
//!
//! The loader module provides:
//! - `ListingDefinition` - Declarative listing specification
//! - YAML parsing with validation
//! - Assembly of a ready-to-use paginator from a definition

mod factory;
mod parser;
mod types;

pub use factory::JsonPaginator;
pub use parser::{load_listing, load_listing_from_str};
pub use types::{HttpDefinition, ListingDefinition, StopConditionDefinition};
