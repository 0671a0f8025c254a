//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: config → OAuth token → listAccessibleCustomers
//! → customer hierarchy → paged report searches → messages

use futures::StreamExt;
use serde_json::json;
use solidafy_googleads::config::TapConfig;
use solidafy_googleads::connector::{Connector, GoogleAdsConnector};
use solidafy_googleads::engine::{Message, SyncConfig};
use solidafy_googleads::output::{JsonLinesSink, MemorySink};
use solidafy_googleads::Error;
use std::collections::BTreeMap;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH: &str = "/v17/customers/1234567890/googleAds:search";

fn live_config(server: &MockServer) -> TapConfig {
    TapConfig::from_value(json!({
        "customer_id": "123-456-7890",
        "developer_token": "dev-token",
        "login_customer_id": "999",
        "oauth_credentials.client_id": "cid",
        "oauth_credentials.client_secret": "secret",
        "oauth_credentials.refresh_token": "refresh",
        "base_url": server.uri(),
        "token_url": format!("{}/token", server.uri()),
        "max_retries": 0,
        "requests_per_second": 1000
    }))
    .unwrap()
}

async fn mount_account(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.test",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v17/customers:listAccessibleCustomers"))
        .and(header("Authorization", "Bearer ya29.test"))
        .and(header("developer-token", "dev-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resourceNames": ["customers/1234567890", "customers/555"]
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(SEARCH))
        .and(body_string_contains("FROM geo_target_constant"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"geoTargetConstant": {"id": "2840", "name": "United States"}}]
        })))
        .mount(server)
        .await;

    // Every other report is empty
    Mock::given(method("POST"))
        .and(path(SEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .with_priority(10)
        .mount(server)
        .await;
}

async fn mount_healthy_hierarchy(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(SEARCH))
        .and(body_string_contains("FROM customer_client"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"customerClient": {"id": "1234567890", "level": "0", "manager": true}},
                {"customerClient": {"id": "111", "level": "1", "manager": false}},
                {"customerClient": {"id": "222", "level": "1", "manager": false}}
            ]
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn records_by_stream(messages: &[Message]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for message in messages {
        if let Some(stream) = message.stream() {
            *counts.entry(stream.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

// ============================================================================
// Read
// ============================================================================

#[tokio::test]
async fn test_full_read_follows_graph_and_pages() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    mount_healthy_hierarchy(&server).await;

    Mock::given(method("POST"))
        .and(path(SEARCH))
        .and(body_string_contains("FROM campaign ORDER BY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"campaign": {"id": "1", "name": "Brand"}},
                {"campaign": {"id": "2", "name": "Generic"}}
            ],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(SEARCH))
        .and(body_string_contains("\"pageToken\":\"page-2\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"campaign": {"id": "3", "name": "Display"}}]
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    let connector = GoogleAdsConnector::new(live_config(&server)).unwrap();
    let items: Vec<_> = connector
        .read(&[], SyncConfig::default())
        .await
        .unwrap()
        .collect()
        .await;

    assert!(items.iter().all(Result::is_ok));
    let messages: Vec<Message> = items.into_iter().map(Result::unwrap).collect();
    let counts = records_by_stream(&messages);

    assert_eq!(counts.get("stream_accessible_customers"), Some(&1));
    assert_eq!(counts.get("stream_customer_hierarchy"), Some(&2));
    assert_eq!(counts.get("stream_campaign"), Some(&3));
    assert_eq!(counts.get("stream_geo_target_constant"), Some(&1));
    assert_eq!(counts.get("stream_ads"), None);

    // v17 fixes the page size, so the geo search must not carry one
    let requests = server.received_requests().await.unwrap();
    let geo_body = requests
        .iter()
        .map(|r| String::from_utf8_lossy(&r.body).to_string())
        .find(|body| body.contains("FROM geo_target_constant"))
        .unwrap();
    assert!(!geo_body.contains("pageSize"));

    let first_campaign = messages
        .iter()
        .find(|m| m.stream() == Some("stream_campaign"))
        .unwrap();
    match first_campaign {
        Message::Record {
            data,
            primary_key,
            schema,
            ..
        } => {
            assert_eq!(data["campaign__name"], "Brand");
            assert_eq!(data["customer_id"], "1234567890");
            assert_eq!(primary_key.values(), &[json!("1")]);
            assert_eq!(schema, "campaign.json");
        }
        other => panic!("unexpected message {other:?}"),
    }
}

#[tokio::test]
async fn test_hierarchy_rejection_starves_reports_only() {
    let server = MockServer::start().await;
    mount_account(&server).await;

    Mock::given(method("POST"))
        .and(path(SEARCH))
        .and(body_string_contains("FROM customer_client"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "Request contains an invalid argument.",
                "details": [{"errors": [{"message": "Invalid customer_client filter."}]}]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(SEARCH))
        .and(body_string_contains("FROM campaign"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let connector = GoogleAdsConnector::new(live_config(&server)).unwrap();
    let mut sink = MemorySink::new();
    let report = connector
        .engine(SyncConfig::default())
        .run(&[], &mut sink)
        .await
        .unwrap();

    assert_eq!(report.records("stream_geo_target_constant"), 1);
    assert_eq!(report.records("stream_campaign"), 0);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0]
        .message
        .contains("Invalid customer_client filter."));

    assert!(matches!(
        report.into_result(),
        Err(Error::StreamsFailed { failed: 1, .. })
    ));
}

#[tokio::test]
async fn test_selected_stream_to_json_lines() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    mount_healthy_hierarchy(&server).await;

    Mock::given(method("POST"))
        .and(path(SEARCH))
        .and(body_string_contains("FROM ad_group_ad WHERE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "campaign": {"id": "1"},
                "adGroupAd": {"ad": {"id": "9"}},
                "segments": {"date": "2024-03-01"},
                "metrics": {"clicks": "4"}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connector = GoogleAdsConnector::new(live_config(&server)).unwrap();
    let mut sink = JsonLinesSink::new(Vec::new());
    connector
        .engine(SyncConfig::default())
        .run(&["stream_adsperformance".to_string()], &mut sink)
        .await
        .unwrap();

    let out = String::from_utf8(sink.into_inner()).unwrap();
    let records: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap())
        .filter(|v| v["type"] == "RECORD")
        .collect();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["record"]["stream"], "stream_adsperformance");
    assert_eq!(
        records[0]["record"]["primary_key"],
        json!(["1", "9", "2024-03-01"])
    );
    assert_eq!(records[0]["record"]["data"]["metrics__clicks"], "4");
}

// ============================================================================
// Check
// ============================================================================

#[tokio::test]
async fn test_check_reports_rejected_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "stale",
            "expires_in": 3600
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v17/customers:listAccessibleCustomers"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"code": 401, "message": "Request had invalid authentication credentials."}
        })))
        .mount(&server)
        .await;

    let connector = GoogleAdsConnector::new(live_config(&server)).unwrap();
    let result = connector.check().await.unwrap();

    assert!(!result.success);
    assert!(result
        .message
        .unwrap()
        .contains("invalid authentication credentials"));
}

#[tokio::test]
async fn test_token_failure_aborts_read() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&server)
        .await;

    let connector = GoogleAdsConnector::new(live_config(&server)).unwrap();
    let mut sink = MemorySink::new();
    let err = connector
        .engine(SyncConfig::default())
        .run(&[], &mut sink)
        .await
        .unwrap_err();

    assert!(err.is_fatal_for_run());
    assert!(sink.record_streams().is_empty());
}
