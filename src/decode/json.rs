//! JSON envelope decoder
//!
//! Pulls items and the continuation token out of a `serde_json::Value`
//! response using configured paths.

use crate::error::{Error, Result};
use crate::pagination::EnvelopeDecoder;
use crate::types::OptionStringExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;

// ============================================================================
// JSON Envelope Decoder
// ============================================================================

/// Decoder for JSON listing responses
///
/// Without an items path the whole response is the item list (an array) or
/// a single item (anything else). Without a token path every response is
/// treated as the last page.
#[derive(Debug, Clone, Default)]
pub struct JsonEnvelopeDecoder {
    /// Path to the items in the response
    items_path: Option<String>,
    /// Path to the continuation token (next URL or cursor)
    token_path: Option<String>,
    /// Field that, when equal to the given value, ends the listing
    stop_when: Option<(String, Value)>,
}

impl JsonEnvelopeDecoder {
    /// Create a decoder that treats the whole response as items
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with an items path
    pub fn with_items_path(path: impl Into<String>) -> Self {
        Self {
            items_path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Set the continuation token path
    #[must_use]
    pub fn token_path(mut self, path: impl Into<String>) -> Self {
        self.token_path = Some(path.into());
        self
    }

    /// End the listing when the field at `path` equals `value`
    ///
    /// For APIs that return a cursor on every page and a separate flag
    /// such as `"has_more": false` on the last one.
    #[must_use]
    pub fn stop_when(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.stop_when = Some((path.into(), value.into()));
        self
    }

    /// Deserialize each item into `T`
    pub fn typed<T: DeserializeOwned>(self) -> TypedJsonDecoder<T> {
        TypedJsonDecoder {
            inner: self,
            _item: PhantomData,
        }
    }

    /// Parse a response body into an envelope
    pub fn parse(body: &str) -> Result<Value> {
        serde_json::from_str(body).map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))
    }

    fn extract_items(&self, value: &Value) -> Result<Vec<Value>> {
        match &self.items_path {
            Some(path) => {
                // Only use jsonpath-rust for wildcard patterns; the simple
                // walker handles dot paths and negative indexes
                if path.contains('*') && !path.contains("[-") {
                    extract_with_jsonpath(value, path)
                } else {
                    match extract_simple_path(value, path) {
                        Some(Value::Array(arr)) => Ok(arr),
                        Some(Value::Null) | None => Ok(vec![]),
                        Some(v @ Value::Object(_)) => Ok(vec![v]),
                        Some(other) => Err(Error::item_extraction(
                            path.as_str(),
                            format!("expected an array or object, found {other}"),
                        )),
                    }
                }
            }
            None => match value {
                Value::Array(arr) => Ok(arr.clone()),
                _ => Ok(vec![value.clone()]),
            },
        }
    }
}

impl EnvelopeDecoder<Value, Value> for JsonEnvelopeDecoder {
    fn items(&self, envelope: &Value) -> Result<Vec<Value>> {
        self.extract_items(envelope)
    }

    fn continuation_token(&self, envelope: &Value) -> Option<String> {
        if let Some((path, stop_value)) = &self.stop_when {
            if extract_simple_path(envelope, path).as_ref() == Some(stop_value) {
                return None;
            }
        }
        let path = self.token_path.as_ref()?;
        extract_simple_path(envelope, path)
            .and_then(|v| scalar_to_string(&v))
            .none_if_empty()
    }
}

// ============================================================================
// Typed Decoder
// ============================================================================

/// JSON decoder that deserializes each item into `T`
#[derive(Debug, Clone)]
pub struct TypedJsonDecoder<T> {
    inner: JsonEnvelopeDecoder,
    _item: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> EnvelopeDecoder<Value, T> for TypedJsonDecoder<T> {
    fn items(&self, envelope: &Value) -> Result<Vec<T>> {
        self.inner
            .extract_items(envelope)?
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value(item)
                    .map_err(|e| Error::decode(format!("Item {index} has unexpected shape: {e}")))
            })
            .collect()
    }

    fn continuation_token(&self, envelope: &Value) -> Option<String> {
        self.inner.continuation_token(envelope)
    }
}

// ============================================================================
// Path helpers
// ============================================================================

/// Identity of an item for de-duplication
///
/// The value at `path` when present, otherwise the whole item, rendered as
/// compact JSON.
pub fn identity_key(item: &Value, path: &str) -> String {
    match extract_simple_path(item, path) {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => item.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Extract records with a full JSONPath expression
fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Vec<Value>> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path)
        .map_err(|e| Error::json_path(format!("Invalid JSONPath: {e}")))?;

    match jp.find(value) {
        Value::Array(arr) => Ok(arr),
        Value::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}

/// Walk a dot path such as `$.data.items`, `urls.api.more` or `data[-1].id`
pub fn extract_simple_path(value: &Value, path: &str) -> Option<Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value.clone());
    }

    let mut current = value;
    for part in path.split('.') {
        // Array indexing like "data[0]" or "items[-1]"
        if let Some(bracket_pos) = part.find('[') {
            let name = &part[..bracket_pos];
            let index_str = part[bracket_pos + 1..].strip_suffix(']')?;

            if !name.is_empty() {
                current = current.get(name)?;
            }

            if index_str == "*" {
                return Some(current.clone());
            }
            let index = index_str.parse::<i64>().ok()?;
            let Value::Array(arr) = current else {
                return None;
            };
            #[allow(clippy::cast_possible_wrap)]
            let idx = if index < 0 {
                arr.len() as i64 + index
            } else {
                index
            };
            if idx < 0 {
                return None;
            }
            current = arr.get(idx as usize)?;
        } else {
            current = current.get(part)?;
        }
    }

    Some(current.clone())
}

/// Render a scalar as a token string; objects, arrays and null have none
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
