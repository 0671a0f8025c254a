//! Record types

use crate::types::{JsonObject, JsonValue};
use serde::Serialize;
use thiserror::Error;

/// Ordered tuple of primary key values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PrimaryKey(Vec<JsonValue>);

impl PrimaryKey {
    /// Borrow the key values
    pub fn values(&self) -> &[JsonValue] {
        &self.0
    }

    /// Canonical string form, stable across runs
    ///
    /// Used as the uniqueness key since JSON values are not hashable.
    pub fn canonical(&self) -> String {
        JsonValue::Array(self.0.clone()).to_string()
    }
}

/// A flattened row with its derived identity
///
/// Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: JsonObject,
    primary_key: PrimaryKey,
}

impl Record {
    /// Derive identity from the named flattened fields, in order
    ///
    /// Fails on the first field that is absent or null.
    pub fn from_fields<S: AsRef<str>>(
        fields: JsonObject,
        key_fields: &[S],
    ) -> Result<Self, RowError> {
        let mut values = Vec::with_capacity(key_fields.len());
        for field in key_fields {
            let field = field.as_ref();
            match fields.get(field) {
                Some(value) if !value.is_null() => values.push(value.clone()),
                _ => {
                    return Err(RowError::MissingKey {
                        field: field.to_string(),
                    })
                }
            }
        }

        Ok(Self {
            fields,
            primary_key: PrimaryKey(values),
        })
    }

    /// Flattened fields
    pub fn fields(&self) -> &JsonObject {
        &self.fields
    }

    /// Look up one flattened field
    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.fields.get(field)
    }

    /// The primary key tuple
    pub fn primary_key(&self) -> &PrimaryKey {
        &self.primary_key
    }

    /// Consume into the flattened fields
    pub fn into_fields(self) -> JsonObject {
        self.fields
    }
}

/// Failure local to a single row
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    /// The row was not a JSON object
    #[error("row is a {found}, expected an object")]
    NotAnObject { found: &'static str },

    /// A primary key field was absent or null
    #[error("missing primary key field '{field}'")]
    MissingKey { field: String },
}

impl RowError {
    /// The offending field, for identity failures
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingKey { field } => Some(field),
            Self::NotAnObject { .. } => None,
        }
    }
}
