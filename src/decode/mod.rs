//! Response decoder module
//!
//! # Overview
//!
//! Google Ads answers in JSON. The decoder parses each page and applies the
//! stream's record locator to find its rows: `$.results[*]` for search
//! responses, `$` when the whole body is the record.

mod decoders;
mod types;

pub use decoders::JsonDecoder;
pub use types::{RecordDecoder, SEARCH_RESULTS, WHOLE_BODY};

#[cfg(test)]
mod tests;
