//! Ads API module
//!
//! The engine only sees `AdsApi::submit`, which turns one rendered request
//! into a lazy row sequence. `GoogleAdsClient` is the REST implementation:
//! auth, rate limiting, retries and page tokens all stay behind the trait.

mod client;
mod types;

pub use client::{
    classify_api_error, GoogleAdsClient, DEVELOPER_TOKEN_HEADER, FIXED_PAGE_SIZE_SINCE,
    LOGIN_CUSTOMER_ID_HEADER,
};
pub use types::{AdsApi, ApiRequest, RequestKind, RowStream};

#[cfg(test)]
pub(crate) mod testing;
