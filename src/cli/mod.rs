//! CLI module
//!
//! Command-line interface for driving listings.
//!
//! # Commands
//!
//! - `validate` - Check a listing definition
//! - `fetch` - Load pages and print their items
//! - `browse` - Next/restart a listing interactively from stdin

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{BrowseCommand, Runner};
