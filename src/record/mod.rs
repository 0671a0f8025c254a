//! Record module
//!
//! Turns raw, nested API rows into flat records with a composite identity.
//!
//! # Overview
//!
//! - `flatten` - joins nested object keys with `__` and snake_cases each
//!   segment, so `{"adGroupAd": {"ad": {"id": "1"}}}` becomes
//!   `{"ad_group_ad__ad__id": "1"}`. Arrays stay single leaf values.
//! - `Record` - a flattened row plus its primary key tuple.
//! - `RowError` - the row-local failures (not an object, missing key field).

mod flatten;
mod types;

pub use flatten::{flatten, snake_case, FIELD_SEPARATOR};
pub use types::{PrimaryKey, Record, RowError};
