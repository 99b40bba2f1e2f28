//! CLI commands and argument parsing

use crate::types::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Solidafy Pager CLI
#[derive(Parser, Debug)]
#[command(name = "solidafy-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Listing definition file (YAML)
    #[arg(short, long, global = true)]
    pub listing: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (overrides --verbose)
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level selected by the flags
    pub fn log_level(&self) -> tracing::Level {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level.into(),
            (None, true) => tracing::Level::DEBUG,
            (None, false) => tracing::Level::INFO,
        }
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate listing definition
    Validate,

    /// Fetch pages and print their items
    Fetch {
        /// Start-over parameter as key=value (repeatable)
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// Maximum pages to load
        #[arg(long, default_value = "1")]
        max_pages: u32,
    },

    /// Drive the listing interactively from stdin
    ///
    /// Commands: next (n), restart [key=value ...] (r), status (s), quit (q)
    Browse {
        /// Start-over parameter as key=value (repeatable)
        #[arg(short, long = "param")]
        params: Vec<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
