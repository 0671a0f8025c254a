//! In-memory `AdsApi` for engine and connector tests

use super::types::{AdsApi, ApiRequest, RequestKind, RowStream};
use crate::error::Result;
use crate::types::JsonValue;
use async_trait::async_trait;
use futures::{stream, StreamExt};
use std::sync::Mutex;

type Handler = Box<dyn Fn(&ApiRequest) -> Vec<Result<JsonValue>> + Send + Sync>;

/// Answers every request from a closure and records what it was asked
pub(crate) struct ScriptedApi {
    handler: Handler,
    calls: Mutex<Vec<ApiRequest>>,
}

impl ScriptedApi {
    pub(crate) fn new(
        handler: impl Fn(&ApiRequest) -> Vec<Result<JsonValue>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every request received, in order
    pub(crate) fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// How many search requests selected from `table`
    pub(crate) fn searches_from(&self, table: &str) -> usize {
        let needle = format!("FROM {table} ");
        self.calls()
            .iter()
            .filter_map(ApiRequest::query)
            .filter(|q| format!("{q} ").contains(&needle))
            .count()
    }

    /// How many listAccessibleCustomers requests were made
    pub(crate) fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|r| r.kind == RequestKind::ListAccessibleCustomers)
            .count()
    }
}

#[async_trait]
impl AdsApi for ScriptedApi {
    fn submit<'a>(&'a self, request: &'a ApiRequest) -> RowStream<'a> {
        self.calls.lock().unwrap().push(request.clone());
        stream::iter((self.handler)(request)).boxed()
    }

    async fn check(&self) -> Result<()> {
        Ok(())
    }
}

/// The table a GAQL query selects from
pub(crate) fn table_of(request: &ApiRequest) -> Option<&str> {
    let query = request.query()?;
    let rest = &query[query.find(" FROM ")? + 6..];
    rest.split_whitespace().next()
}
