//! Tests for the decode module

use super::*;
use crate::error::Error;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_search_results() {
    let decoder = JsonDecoder::with_path(SEARCH_RESULTS);
    let body = r#"{
        "results": [
            {"campaign": {"id": "1", "resourceName": "customers/9/campaigns/1"}},
            {"campaign": {"id": "2", "resourceName": "customers/9/campaigns/2"}}
        ],
        "nextPageToken": "abc",
        "fieldMask": "campaign.id"
    }"#;

    let rows = decoder.decode(body).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["campaign"]["id"], json!("1"));
    assert_eq!(rows[1]["campaign"]["id"], json!("2"));
}

#[test]
fn test_search_results_missing_on_empty_page() {
    let decoder = JsonDecoder::with_path(SEARCH_RESULTS);
    let rows = decoder.decode(r#"{"fieldMask": "campaign.id"}"#).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_whole_body_is_one_row() {
    let decoder = JsonDecoder::new();
    let rows = decoder
        .decode(r#"{"resourceNames": ["customers/1", "customers/2"]}"#)
        .unwrap();
    assert_eq!(rows, vec![json!({"resourceNames": ["customers/1", "customers/2"]})]);
}

#[test]
fn test_whole_body_empty_object_has_no_rows() {
    let rows = JsonDecoder::new().extract(&json!({})).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_simple_path() {
    let decoder = JsonDecoder::with_path("$.data.items");
    let rows = decoder
        .extract(&json!({"data": {"items": [{"id": 1}, {"id": 2}]}}))
        .unwrap();
    assert_eq!(rows.len(), 2);

    let single = JsonDecoder::with_path("data.item")
        .extract(&json!({"data": {"item": {"id": 3}}}))
        .unwrap();
    assert_eq!(single, vec![json!({"id": 3})]);
}

#[test]
fn test_invalid_json() {
    let err = JsonDecoder::new().decode("not json").unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[test]
fn test_record_path_accessor() {
    assert_eq!(JsonDecoder::new().record_path(), "$");
    assert_eq!(JsonDecoder::with_path(SEARCH_RESULTS).record_path(), "$.results[*]");
}
