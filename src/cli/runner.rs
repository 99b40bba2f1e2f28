//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::error::{Error, Result};
use crate::loader::{load_listing, JsonPaginator, ListingDefinition};
use crate::pagination::PaginatorUpdate;
use crate::types::{parse_key_values, StringMap};
use futures::StreamExt;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// A line typed into `browse`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    /// Load the next page
    Next,
    /// Start over, with new parameters or the previous ones
    Restart(Option<StringMap>),
    /// Print the current snapshot
    Status,
    /// Leave the session
    Quit,
}

impl BrowseCommand {
    /// Parse one input line; `None` for blank or unknown input
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Ok(None);
        };
        let command = match first {
            "next" | "n" => Self::Next,
            "restart" | "r" => {
                let pairs: Vec<&str> = words.collect();
                if pairs.is_empty() {
                    Self::Restart(None)
                } else {
                    Self::Restart(Some(parse_key_values(pairs)?))
                }
            }
            "status" | "s" => Self::Status,
            "quit" | "q" | "exit" => Self::Quit,
            _ => return Ok(None),
        };
        Ok(Some(command))
    }
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Validate => self.validate(),
            Commands::Fetch { params, max_pages } => self.fetch(params, *max_pages).await,
            Commands::Browse { params } => self.browse(params).await,
        }
    }

    /// Load listing definition
    fn load_listing(&self) -> Result<ListingDefinition> {
        let path = self
            .cli
            .listing
            .as_ref()
            .ok_or_else(|| Error::config("Listing file not specified (use -l flag)"))?;
        load_listing(path)
    }

    /// Validate listing definition
    fn validate(&self) -> Result<()> {
        let listing = self.load_listing()?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!(
                    "Listing '{}' is valid ({} {})",
                    listing.name,
                    listing.base_url,
                    listing.path
                )
            }
        }));

        Ok(())
    }

    /// Load up to `max_pages` pages and print every item once
    async fn fetch(&self, params: &[String], max_pages: u32) -> Result<()> {
        let listing = self.load_listing()?;
        let params = parse_params(params)?;
        let paginator = listing.paginator()?;

        // Subscribe before starting so no update is missed
        let mut updates = Box::pin(paginator.updates());
        paginator.start_over_with(params)?;

        let mut printed = 0usize;
        let mut page_loaded = false;

        while let Some(update) = updates.next().await {
            match update {
                PaginatorUpdate::LoadingPage(page) => {
                    debug!(page, "Loading page");
                    page_loaded = false;
                }
                PaginatorUpdate::Items(items) => {
                    for item in items.iter().skip(printed) {
                        self.output_item(item);
                    }
                    printed = items.len();
                    page_loaded = true;
                }
                PaginatorUpdate::Fetching(true) => {}
                PaginatorUpdate::Fetching(false) => {
                    let snapshot = paginator.snapshot();
                    if !page_loaded {
                        paginator.shutdown()?;
                        return Err(Error::Other(format!(
                            "Page {} of '{}' failed to load",
                            snapshot.current_page + 1,
                            listing.name
                        )));
                    }
                    if !snapshot.has_more || snapshot.current_page >= max_pages {
                        break;
                    }
                    paginator.next_page()?;
                }
            }
        }

        let snapshot = paginator.snapshot();
        info!(
            listing = %listing.name,
            pages = snapshot.current_page,
            items = snapshot.items.len(),
            has_more = snapshot.has_more,
            "Fetch finished"
        );
        paginator.shutdown()?;
        Ok(())
    }

    /// Interactive session: stdin commands in, updates out
    async fn browse(&self, params: &[String]) -> Result<()> {
        let listing = self.load_listing()?;
        let mut last_params = parse_params(params)?;
        let paginator = listing.paginator()?;

        let mut updates = Box::pin(paginator.updates());
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut printed = 0usize;

        paginator.start_over_with(last_params.clone())?;

        loop {
            tokio::select! {
                update = updates.next() => {
                    let Some(update) = update else { break };
                    printed = self.output_update(&update, printed);
                }
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    match BrowseCommand::parse(&line) {
                        Ok(Some(BrowseCommand::Next)) => paginator.next_page()?,
                        Ok(Some(BrowseCommand::Restart(params))) => {
                            if let Some(params) = params {
                                last_params = params;
                            }
                            printed = 0;
                            paginator.start_over_with(last_params.clone())?;
                        }
                        Ok(Some(BrowseCommand::Status)) => self.output_status(&paginator),
                        Ok(Some(BrowseCommand::Quit)) => break,
                        Ok(None) if line.trim().is_empty() => {}
                        Ok(None) => warn!(input = %line.trim(), "Unknown command"),
                        Err(e) => warn!(input = %line.trim(), error = %e, "Invalid command"),
                    }
                }
            }
        }

        paginator.shutdown()?;
        Ok(())
    }

    /// Print an update; returns how many accumulated items have been printed
    fn output_update(&self, update: &PaginatorUpdate<Value>, printed: usize) -> usize {
        match update {
            PaginatorUpdate::Items(items) => {
                let start = if items.len() < printed { 0 } else { printed };
                for item in items.iter().skip(start) {
                    self.output_item(item);
                }
                items.len()
            }
            PaginatorUpdate::Fetching(fetching) => {
                self.output_message(&json!({"type": "FETCHING", "fetching": fetching}));
                printed
            }
            PaginatorUpdate::LoadingPage(page) => {
                self.output_message(&json!({"type": "LOADING_PAGE", "page": page}));
                printed
            }
        }
    }

    fn output_status(&self, paginator: &JsonPaginator) {
        let snapshot = paginator.snapshot();
        self.output_message(&json!({
            "type": "STATUS",
            "status": {
                "generation": snapshot.generation,
                "page": snapshot.current_page,
                "items": snapshot.items.len(),
                "fetching": snapshot.is_fetching,
                "has_more": snapshot.has_more,
            }
        }));
    }

    fn output_item(&self, item: &Value) {
        self.output_message(&json!({"type": "ITEM", "item": item}));
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

fn parse_params(pairs: &[String]) -> Result<StringMap> {
    parse_key_values(pairs.iter().map(String::as_str))
}
