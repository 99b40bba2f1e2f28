//! YAML parser for listing definitions
//!
//! Parses and validates listing YAML files.

use crate::error::{Error, Result};
use crate::listing::TokenStyle;
use crate::loader::types::{ListingDefinition, StopConditionDefinition};
use std::fs;
use std::path::Path;

/// Load a listing definition from a YAML file
///
/// # Examples
///
/// ```ignore
/// let listing = load_listing("./discover.yaml")?;
/// ```
pub fn load_listing(path: impl AsRef<Path>) -> Result<ListingDefinition> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!(
                "Failed to read listing file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_listing_from_str(&content)
}

/// Load a listing definition from a YAML string
pub fn load_listing_from_str(yaml: &str) -> Result<ListingDefinition> {
    let def: ListingDefinition = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse listing YAML: {e}")))?;

    validate_listing(&def)?;
    Ok(def)
}

/// Validate a listing definition
fn validate_listing(def: &ListingDefinition) -> Result<()> {
    if def.name.is_empty() {
        return Err(Error::config("Listing name cannot be empty"));
    }

    if def.base_url.is_empty() {
        return Err(Error::config("Listing base_url cannot be empty"));
    }
    url::Url::parse(&def.base_url).map_err(|e| {
        Error::invalid_value("base_url", format!("'{}' is not a URL: {e}", def.base_url))
    })?;

    if def.path.is_empty() {
        return Err(Error::config(format!(
            "Listing '{}' path cannot be empty",
            def.name
        )));
    }

    if let TokenStyle::QueryParam { param } = &def.token_style {
        if param.is_empty() {
            return Err(Error::invalid_value(
                "token_style.param",
                "cursor parameter name cannot be empty",
            ));
        }
        if def.token_path.is_none() {
            return Err(Error::config(format!(
                "Listing '{}' uses a cursor parameter but has no token_path",
                def.name
            )));
        }
    }

    for (field, path) in [
        ("items_path", &def.items_path),
        ("token_path", &def.token_path),
        ("dedup_path", &def.dedup_path),
    ] {
        if matches!(path, Some(p) if p.trim().is_empty()) {
            return Err(Error::invalid_value(field, "path cannot be empty"));
        }
    }

    if let Some(StopConditionDefinition::Field { path, .. }) = &def.stop_when {
        if path.is_empty() {
            return Err(Error::invalid_value("stop_when.path", "path cannot be empty"));
        }
    }

    if def.http.timeout_secs == 0 {
        return Err(Error::invalid_value("http.timeout_secs", "must be positive"));
    }

    Ok(())
}
