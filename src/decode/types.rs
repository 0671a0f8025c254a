//! Decoder traits

use crate::error::Result;
use serde_json::Value;

/// Root locator: the whole response body is one record
pub const WHOLE_BODY: &str = "$";

/// Locator of the result rows in a `googleAds:search` response
pub const SEARCH_RESULTS: &str = "$.results[*]";

/// Trait for decoding response bodies into rows
pub trait RecordDecoder: Send + Sync {
    /// Parse the response body into a single JSON value
    fn decode_raw(&self, body: &str) -> Result<Value>;

    /// Pick the rows out of an already parsed response
    fn extract(&self, value: &Value) -> Result<Vec<Value>>;

    /// Parse the response body and pick out the rows
    fn decode(&self, body: &str) -> Result<Vec<Value>> {
        let value = self.decode_raw(body)?;
        self.extract(&value)
    }
}
