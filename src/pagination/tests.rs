//! Tests for the pagination module

use super::*;
use serde_json::json;

#[test]
fn test_first_page_has_no_token() {
    let paginator = PageTokenPaginator::default();
    let state = PaginationState::new();
    assert!(paginator.page_params(&state).is_empty());
}

#[test]
fn test_follows_next_page_token() {
    let paginator = PageTokenPaginator::default();
    let mut state = PaginationState::new();

    let next = paginator.process_response(
        &json!({"results": [{}, {}], "nextPageToken": "abc"}),
        2,
        &mut state,
    );

    assert_eq!(next, NextPage::with_token("abc"));
    assert_eq!(state.page, 1);
    assert_eq!(state.total_fetched, 2);

    let params = paginator.page_params(&state);
    assert_eq!(params.get("pageToken"), Some(&json!("abc")));
}

#[test]
fn test_missing_token_ends() {
    let paginator = PageTokenPaginator::default();
    let mut state = PaginationState::new();

    let next = paginator.process_response(&json!({"results": [{}]}), 1, &mut state);
    assert!(next.is_done());
    assert!(state.done);
    assert!(paginator.page_params(&state).is_empty());
}

#[test]
fn test_empty_token_ends() {
    let paginator = PageTokenPaginator::default();
    let mut state = PaginationState::new();

    let next = paginator.process_response(&json!({"nextPageToken": ""}), 0, &mut state);
    assert!(next.is_done());
}

#[test]
fn test_repeated_token_ends() {
    let paginator = PageTokenPaginator::default();
    let mut state = PaginationState::new();

    let body = json!({"nextPageToken": "same"});
    assert!(!paginator.process_response(&body, 1, &mut state).is_done());
    assert!(paginator.process_response(&body, 1, &mut state).is_done());
    assert_eq!(state.page, 2);
}

#[test]
fn test_custom_fields() {
    let paginator = PageTokenPaginator::new("token", "next");
    let mut state = PaginationState::new();
    paginator.process_response(&json!({"next": "t2"}), 0, &mut state);
    assert_eq!(paginator.page_params(&state).get("token"), Some(&json!("t2")));
}

#[test]
fn test_no_paginator() {
    let paginator = NoPaginator;
    let mut state = PaginationState::new();

    assert!(paginator.page_params(&state).is_empty());
    let next = paginator.process_response(&json!({"nextPageToken": "ignored"}), 3, &mut state);
    assert!(next.is_done());
    assert_eq!(state.total_fetched, 3);
}
