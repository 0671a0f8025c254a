//! Decoder implementations

use super::types::{RecordDecoder, WHOLE_BODY};
use crate::error::{Error, Result};
use serde_json::Value;

// ============================================================================
// JSON Decoder
// ============================================================================

/// JSON decoder applying a record locator to each response page
#[derive(Debug, Clone)]
pub struct JsonDecoder {
    record_path: String,
}

impl Default for JsonDecoder {
    fn default() -> Self {
        Self::with_path(WHOLE_BODY)
    }
}

impl JsonDecoder {
    /// Decoder returning the whole body as a single row
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder for a record locator such as `$.results[*]`
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            record_path: path.into(),
        }
    }

    /// The record locator
    pub fn record_path(&self) -> &str {
        &self.record_path
    }
}

impl RecordDecoder for JsonDecoder {
    fn decode_raw(&self, body: &str) -> Result<Value> {
        serde_json::from_str(body).map_err(|e| Error::Decode {
            message: format!("Failed to parse JSON: {e}"),
        })
    }

    fn extract(&self, value: &Value) -> Result<Vec<Value>> {
        let path = self.record_path.as_str();

        if path == WHOLE_BODY || path.is_empty() {
            // An empty page body is "no rows", not one empty row
            return Ok(match value {
                Value::Object(map) if map.is_empty() => vec![],
                _ => vec![value.clone()],
            });
        }

        if path.contains('*') {
            return extract_with_jsonpath(value, path);
        }

        match extract_simple_path(value, path) {
            Some(Value::Array(rows)) => Ok(rows),
            Some(Value::Null) | None => Ok(vec![]),
            Some(row) => Ok(vec![row]),
        }
    }
}

/// Follow a dotted path such as `$.data.items`
fn extract_simple_path(value: &Value, path: &str) -> Option<Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = value;
    for part in path.split('.') {
        current = current.get(part)?;
    }
    Some(current.clone())
}

/// Evaluate a wildcard path with jsonpath-rust
///
/// A missing array (the API omits `results` on an empty page) yields no rows.
fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Vec<Value>> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path).map_err(|e| Error::JsonPath {
        message: format!("Invalid JSONPath '{path}': {e}"),
    })?;

    match jp.find(value) {
        Value::Array(rows) => Ok(rows),
        Value::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}
