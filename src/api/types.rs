//! API request types and the client trait

use crate::decode::{SEARCH_RESULTS, WHOLE_BODY};
use crate::error::Result;
use crate::types::JsonValue;
use async_trait::async_trait;
use futures::Stream;
use std::fmt;
use std::pin::Pin;

/// Lazy sequence of raw rows, in API order, across all pages
pub type RowStream<'a> = Pin<Box<dyn Stream<Item = Result<JsonValue>> + Send + 'a>>;

/// Which API capability a request uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// `GET /{version}/customers:listAccessibleCustomers`
    ListAccessibleCustomers,
    /// `POST /{version}/customers/{customer_id}/googleAds:search`
    Search {
        /// Account the query runs against
        customer_id: String,
        /// Rendered GAQL text
        query: String,
        /// Optional `pageSize` body field
        page_size: Option<u32>,
    },
}

/// A fully rendered request plus where its rows live in the response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// The capability and its parameters
    pub kind: RequestKind,
    /// Record locator applied to every response page
    pub record_path: String,
}

impl ApiRequest {
    /// List the accounts the credential can access
    pub fn list_accessible_customers() -> Self {
        Self {
            kind: RequestKind::ListAccessibleCustomers,
            record_path: WHOLE_BODY.to_string(),
        }
    }

    /// Run a GAQL query against one account
    pub fn search(customer_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            kind: RequestKind::Search {
                customer_id: customer_id.into(),
                query: query.into(),
                page_size: None,
            },
            record_path: SEARCH_RESULTS.to_string(),
        }
    }

    /// Set the page size (search requests only)
    #[must_use]
    pub fn with_page_size(mut self, size: Option<u32>) -> Self {
        if let RequestKind::Search { page_size, .. } = &mut self.kind {
            *page_size = size;
        }
        self
    }

    /// Override the record locator
    #[must_use]
    pub fn with_record_path(mut self, path: impl Into<String>) -> Self {
        self.record_path = path.into();
        self
    }

    /// GAQL text, for search requests
    pub fn query(&self) -> Option<&str> {
        match &self.kind {
            RequestKind::Search { query, .. } => Some(query),
            RequestKind::ListAccessibleCustomers => None,
        }
    }

    /// Target account, for search requests
    pub fn customer_id(&self) -> Option<&str> {
        match &self.kind {
            RequestKind::Search { customer_id, .. } => Some(customer_id),
            RequestKind::ListAccessibleCustomers => None,
        }
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RequestKind::ListAccessibleCustomers => write!(f, "customers:listAccessibleCustomers"),
            RequestKind::Search { customer_id, .. } => {
                write!(f, "customers/{customer_id}/googleAds:search")
            }
        }
    }
}

/// The query-based read API the engine pulls rows from
///
/// Implementations page internally and retry transient failures before
/// surfacing them. Errors are classified with `Error::kind`.
#[async_trait]
pub trait AdsApi: Send + Sync {
    /// Execute a request, yielding rows lazily across all pages
    fn submit<'a>(&'a self, request: &'a ApiRequest) -> RowStream<'a>;

    /// Verify credentials and connectivity
    async fn check(&self) -> Result<()>;
}
