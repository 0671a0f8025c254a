//! Row flattening

use super::types::RowError;
use crate::types::{JsonObject, JsonValue};

/// Separator placed between nested key segments
pub const FIELD_SEPARATOR: &str = "__";

/// Flatten a raw row into a single-level object
///
/// Nested objects are walked depth-first; arrays and scalars are leaves.
/// An empty nested object is kept as a leaf so the key is not lost.
pub fn flatten(row: &JsonValue) -> Result<JsonObject, RowError> {
    let JsonValue::Object(map) = row else {
        return Err(RowError::NotAnObject {
            found: json_type_name(row),
        });
    };

    let mut out = JsonObject::new();
    flatten_into(map, None, &mut out);
    Ok(out)
}

fn flatten_into(map: &JsonObject, prefix: Option<&str>, out: &mut JsonObject) {
    for (key, value) in map {
        let segment = snake_case(key);
        let flat_key = match prefix {
            Some(p) => format!("{p}{FIELD_SEPARATOR}{segment}"),
            None => segment,
        };

        match value {
            JsonValue::Object(child) if !child.is_empty() => {
                flatten_into(child, Some(&flat_key), out);
            }
            _ => {
                out.insert(flat_key, value.clone());
            }
        }
    }
}

/// Convert a camelCase key segment to snake_case
///
/// Keys that are already snake_case pass through unchanged.
pub fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
