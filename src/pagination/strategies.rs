//! Pagination strategy implementations

use super::types::{NextPage, PaginationState, Paginator};
use crate::types::{JsonObject, JsonValue};

// ============================================================================
// Page Token Pagination
// ============================================================================

/// Page token pagination, as used by `googleAds:search`
///
/// Each response carries `nextPageToken`; the next request repeats the same
/// body with `pageToken` set. A missing or empty token ends the sequence.
#[derive(Debug, Clone)]
pub struct PageTokenPaginator {
    /// Request body field carrying the token
    pub token_field: String,
    /// Top-level response field holding the next token
    pub next_token_field: String,
}

impl Default for PageTokenPaginator {
    fn default() -> Self {
        Self::new("pageToken", "nextPageToken")
    }
}

impl PageTokenPaginator {
    /// Create a new page token paginator
    pub fn new(token_field: impl Into<String>, next_token_field: impl Into<String>) -> Self {
        Self {
            token_field: token_field.into(),
            next_token_field: next_token_field.into(),
        }
    }
}

impl Paginator for PageTokenPaginator {
    fn page_params(&self, state: &PaginationState) -> JsonObject {
        let mut params = JsonObject::new();
        if let Some(token) = &state.token {
            params.insert(self.token_field.clone(), JsonValue::String(token.clone()));
        }
        params
    }

    fn process_response(
        &self,
        body: &JsonValue,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        state.add_page(records_count);

        match body.get(&self.next_token_field).and_then(JsonValue::as_str) {
            Some(token) if !token.is_empty() => {
                // A repeated token would loop forever
                if state.token.as_deref() == Some(token) {
                    state.mark_done();
                    return NextPage::Done;
                }
                state.token = Some(token.to_string());
                NextPage::with_token(token)
            }
            _ => {
                state.mark_done();
                NextPage::Done
            }
        }
    }
}

// ============================================================================
// No Pagination
// ============================================================================

/// Single-page responses
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPaginator;

impl Paginator for NoPaginator {
    fn page_params(&self, _state: &PaginationState) -> JsonObject {
        JsonObject::new()
    }

    fn process_response(
        &self,
        _body: &JsonValue,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        state.add_page(records_count);
        state.mark_done();
        NextPage::Done
    }
}
