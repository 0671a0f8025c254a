//! Google Ads REST client

use super::types::{AdsApi, ApiRequest, RequestKind, RowStream};
use crate::auth::AuthConfig;
use crate::config::TapConfig;
use crate::decode::{JsonDecoder, RecordDecoder};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig, RequestConfig};
use crate::pagination::{NoPaginator, PageTokenPaginator, PaginationState, Paginator};
use crate::types::{JsonObject, JsonValue};
use async_trait::async_trait;
use futures::{stream, StreamExt, TryStreamExt};
use reqwest::Method;
use tracing::debug;

/// Header carrying the developer token
pub const DEVELOPER_TOKEN_HEADER: &str = "developer-token";

/// Header carrying the manager account id
pub const LOGIN_CUSTOMER_ID_HEADER: &str = "login-customer-id";

/// First API version where search pages are fixed at 10,000 rows and
/// `pageSize` is rejected
pub const FIXED_PAGE_SIZE_SINCE: u32 = 17;

/// `AdsApi` over the Google Ads REST interface
#[derive(Debug)]
pub struct GoogleAdsClient {
    http: HttpClient,
    api_version: String,
    paginator: PageTokenPaginator,
}

impl GoogleAdsClient {
    /// Build a client from the run configuration
    pub fn new(config: &TapConfig) -> Result<Self> {
        let mut builder = HttpClientConfig::builder()
            .base_url(&config.base_url)
            .max_retries(config.max_retries)
            .rate_limit(RateLimiterConfig::per_second(config.requests_per_second))
            .header(DEVELOPER_TOKEN_HEADER, &config.developer_token);
        if let Some(login) = &config.login_customer_id {
            builder = builder.header(LOGIN_CUSTOMER_ID_HEADER, login);
        }

        let http = HttpClient::with_config(builder.build())?
            .with_auth(AuthConfig::from_tap_config(config));
        Ok(Self::with_http(http, &config.api_version))
    }

    /// Wrap an already configured HTTP client
    pub fn with_http(http: HttpClient, api_version: impl Into<String>) -> Self {
        Self {
            http,
            api_version: api_version.into(),
            paginator: PageTokenPaginator::default(),
        }
    }

    /// API version path segment
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Whether this API version still accepts `pageSize` on search
    pub fn accepts_page_size(&self) -> bool {
        self.api_version
            .strip_prefix('v')
            .and_then(|major| major.parse::<u32>().ok())
            .is_some_and(|major| major < FIXED_PAGE_SIZE_SINCE)
    }

    fn paginator_for(&self, request: &ApiRequest) -> &dyn Paginator {
        match request.kind {
            RequestKind::Search { .. } => &self.paginator,
            RequestKind::ListAccessibleCustomers => &NoPaginator,
        }
    }

    /// Fetch one page, merging paging fields into the request body
    async fn fetch_page(&self, request: &ApiRequest, page: JsonObject) -> Result<JsonValue> {
        let version = &self.api_version;
        let (method, url, config) = match &request.kind {
            RequestKind::ListAccessibleCustomers => (
                Method::GET,
                format!("/{version}/customers:listAccessibleCustomers"),
                RequestConfig::new(),
            ),
            RequestKind::Search {
                customer_id,
                query,
                page_size,
            } => {
                let mut body = JsonObject::new();
                body.insert("query".to_string(), JsonValue::String(query.clone()));
                match page_size {
                    Some(size) if self.accepts_page_size() => {
                        body.insert("pageSize".to_string(), JsonValue::from(*size));
                    }
                    Some(size) => {
                        debug!(page_size = size, version = %version, "page size fixed by API, not sent");
                    }
                    None => {}
                }
                body.extend(page);
                (
                    Method::POST,
                    format!("/{version}/customers/{customer_id}/googleAds:search"),
                    RequestConfig::new().json(JsonValue::Object(body)),
                )
            }
        };

        self.http
            .request_json(method, &url, config)
            .await
            .map_err(classify_api_error)
    }
}

#[async_trait]
impl AdsApi for GoogleAdsClient {
    fn submit<'a>(&'a self, request: &'a ApiRequest) -> RowStream<'a> {
        let paginator = self.paginator_for(request);
        let decoder = JsonDecoder::with_path(&request.record_path);

        let pages = stream::try_unfold(Some(PaginationState::new()), move |state| {
            let decoder = decoder.clone();
            async move {
                let Some(mut state) = state else {
                    return Ok(None);
                };

                let body = self.fetch_page(request, paginator.page_params(&state)).await?;
                let rows = decoder.extract(&body)?;
                let next = paginator.process_response(&body, rows.len(), &mut state);
                debug!(
                    request = %request,
                    page = state.page,
                    rows = rows.len(),
                    "fetched page"
                );

                let state = if next.is_done() { None } else { Some(state) };
                Ok::<_, Error>(Some((rows, state)))
            }
        });

        pages
            .map_ok(|rows| stream::iter(rows.into_iter().map(Ok)))
            .try_flatten()
            .boxed()
    }

    async fn check(&self) -> Result<()> {
        let request = ApiRequest::list_accessible_customers();
        self.fetch_page(&request, JsonObject::new()).await?;
        Ok(())
    }
}

/// Map platform rejections onto the run's error taxonomy
///
/// 400 becomes `Error::Query` carrying the platform's own message, 401
/// becomes `Error::Auth`. Everything else is already classified.
pub fn classify_api_error(err: Error) -> Error {
    match err {
        Error::HttpStatus { status: 400, body } => Error::query(platform_message(&body)),
        Error::HttpStatus { status: 401, body } => Error::auth(platform_message(&body)),
        other => other,
    }
}

/// Pull the most specific message out of a Google error body
fn platform_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<JsonValue>(body) else {
        return body.trim().to_string();
    };

    let detailed: Vec<&str> = value
        .pointer("/error/details")
        .and_then(JsonValue::as_array)
        .into_iter()
        .flatten()
        .filter_map(|detail| detail.get("errors").and_then(JsonValue::as_array))
        .flatten()
        .filter_map(|e| e.get("message").and_then(JsonValue::as_str))
        .collect();
    if !detailed.is_empty() {
        return detailed.join("; ");
    }

    value
        .pointer("/error/message")
        .and_then(JsonValue::as_str)
        .map_or_else(|| body.trim().to_string(), str::to_string)
}
