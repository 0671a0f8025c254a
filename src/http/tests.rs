//! Tests for the HTTP client module

use super::*;
use crate::auth::AuthConfig;
use crate::error::{Error, ErrorKind};
use crate::types::BackoffType;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_client(server: &MockServer, max_retries: u32) -> HttpClient {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .max_retries(max_retries)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .no_rate_limit()
        .build();
    HttpClient::with_config(config).unwrap()
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.max_retries, 3);
    assert!(config.base_url.is_none());
    assert!(config.rate_limit.is_some());
    assert!(config.user_agent.starts_with("solidafy-googleads/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://googleads.googleapis.com")
        .timeout(Duration::from_secs(120))
        .max_retries(5)
        .backoff(
            BackoffType::Linear,
            Duration::from_millis(200),
            Duration::from_secs(30),
        )
        .header("developer-token", "dev")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(
        config.base_url.as_deref(),
        Some("https://googleads.googleapis.com")
    );
    assert_eq!(config.timeout, Duration::from_secs(120));
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.backoff_type, BackoffType::Linear);
    assert_eq!(
        config.default_headers.get("developer-token"),
        Some(&"dev".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[tokio::test]
async fn test_post_json_with_default_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v17/customers/123/googleAds:search"))
        .and(header("developer-token", "dev"))
        .and(body_json(json!({"query": "SELECT campaign.id FROM campaign"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .header("developer-token", "dev")
        .no_rate_limit()
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let body = client
        .request_json(
            reqwest::Method::POST,
            "/v17/customers/123/googleAds:search",
            RequestConfig::new().json(json!({"query": "SELECT campaign.id FROM campaign"})),
        )
        .await
        .unwrap();

    assert_eq!(body, json!({"results": []}));
}

#[tokio::test]
async fn test_request_headers_and_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v17/customers:listAccessibleCustomers"))
        .and(header("login-customer-id", "999"))
        .and(wiremock::matchers::query_param("alt", "json"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server, 0);
    let response = client
        .request(
            reqwest::Method::GET,
            "/v17/customers:listAccessibleCustomers",
            RequestConfig::new()
                .header("login-customer-id", "999")
                .query("alt", "json"),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_empty_body_is_empty_object() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server, 0);
    let body = client
        .request_json(reqwest::Method::GET, "/empty", RequestConfig::new())
        .await
        .unwrap();
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_client_error_keeps_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad query"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server, 3);
    let err = client.post("/search", json!({})).await.unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "bad query");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_retry_on_500() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server, 3);
    let response = client.get("/flaky").await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_rate_limit_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "0")
                .set_body_string("RESOURCE_EXHAUSTED"),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server, 2);
    let response = client.get("/limited").await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_retries_exhausted_is_transient() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server, 2);
    let err = client.get("/down").await.unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 503, .. }));
    assert_eq!(err.kind(), ErrorKind::Transient);
}

#[tokio::test]
async fn test_bearer_auth_applied() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/secure"))
        .and(header("Authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server, 0).with_auth(AuthConfig::Bearer {
        token: "abc".to_string(),
    });
    assert!(client.authenticator().is_some());
    client.get("/secure").await.unwrap();
}

#[tokio::test]
async fn test_full_url_bypasses_base() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/absolute"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder().no_rate_limit().build();
    let client = HttpClient::with_config(config).unwrap();
    let response = client
        .get(&format!("{}/absolute", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_rate_limited_client() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .rate_limit(RateLimiterConfig::new(100, 10))
        .build();
    let client = HttpClient::with_config(config).unwrap();
    assert!(client.has_rate_limiter());

    for _ in 0..3 {
        client.get("/data").await.unwrap();
    }
}

#[test]
fn test_calculate_backoff() {
    let build = |kind| {
        let config = HttpClientConfig::builder()
            .backoff(kind, Duration::from_millis(100), Duration::from_millis(500))
            .no_rate_limit()
            .build();
        HttpClient::with_config(config).unwrap()
    };

    let constant = build(BackoffType::Constant);
    assert_eq!(constant.calculate_backoff(5), Duration::from_millis(100));

    let linear = build(BackoffType::Linear);
    assert_eq!(linear.calculate_backoff(1), Duration::from_millis(200));

    let exponential = build(BackoffType::Exponential);
    assert_eq!(exponential.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(exponential.calculate_backoff(2), Duration::from_millis(400));
    assert_eq!(exponential.calculate_backoff(10), Duration::from_millis(500));
}
