//! Connector trait and the Google Ads connector
//!
//! The connector is the outer surface over the engine: `spec`, `check`,
//! `discover` and a streaming `read`.

use crate::api::{AdsApi, GoogleAdsClient};
use crate::config::TapConfig;
use crate::engine::{Message, SyncConfig, SyncEngine};
use crate::error::Result;
use crate::output::ChannelSink;
use crate::stream::{google_ads_catalog, Catalog, StreamDescriptor};
use async_trait::async_trait;
use futures::{stream, Stream};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

// ============================================================================
// Connector Spec
// ============================================================================

/// Connector specification returned by spec()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorSpec {
    /// Connector name
    pub name: String,

    /// Human-readable title
    pub title: String,

    /// Description
    pub description: Option<String>,

    /// Accepted configuration properties
    pub config: Value,
}

// ============================================================================
// Check Result
// ============================================================================

/// Result of a connection check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Whether the check succeeded
    pub success: bool,

    /// Error message if failed
    pub message: Option<String>,
}

impl CheckResult {
    /// Create a successful check result
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// Create a failed check result
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Connector Trait
// ============================================================================

/// Messages `read` buffers ahead of the consumer before the run pauses
pub const READ_BUFFER: usize = 1_000;

/// Type alias for the message stream returned by read()
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<Message>> + Send>>;

/// Core trait the connector implements
#[async_trait]
pub trait Connector: Send + Sync {
    /// Returns the connector specification
    fn spec(&self) -> ConnectorSpec;

    /// Tests if credentials and configuration are valid
    async fn check(&self) -> Result<CheckResult>;

    /// Lists available streams
    async fn discover(&self) -> Result<Vec<StreamDescriptor>>;

    /// Reads the selected streams (all when empty)
    ///
    /// The stream ends with an error item if the run aborted or any stream
    /// invocation failed.
    async fn read(&self, selection: &[String], sync: SyncConfig) -> Result<MessageStream>;
}

// ============================================================================
// Google Ads Connector
// ============================================================================

/// Connector over the Google Ads stream forest
#[derive(Clone)]
pub struct GoogleAdsConnector {
    config: Arc<TapConfig>,
    catalog: Arc<Catalog>,
    api: Arc<dyn AdsApi>,
}

impl GoogleAdsConnector {
    /// Build a connector talking to the live API
    pub fn new(config: TapConfig) -> Result<Self> {
        let api = GoogleAdsClient::new(&config)?;
        Self::with_api(config, Arc::new(api))
    }

    /// Build a connector over any `AdsApi`
    pub fn with_api(config: TapConfig, api: Arc<dyn AdsApi>) -> Result<Self> {
        config.validate()?;
        let catalog = google_ads_catalog(&config)?;
        Ok(Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            api,
        })
    }

    /// The run configuration
    pub fn config(&self) -> &TapConfig {
        &self.config
    }

    /// The stream catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Specification, available without a config
    pub fn describe() -> ConnectorSpec {
        ConnectorSpec {
            name: env!("CARGO_PKG_NAME").to_string(),
            title: "Google Ads".to_string(),
            description: Some(env!("CARGO_PKG_DESCRIPTION").to_string()),
            config: TapConfig::spec(),
        }
    }

    /// An engine over this connector's catalog and API
    pub fn engine(&self, sync: SyncConfig) -> SyncEngine {
        SyncEngine::new(
            Arc::clone(&self.catalog),
            Arc::clone(&self.api),
            Arc::clone(&self.config),
        )
        .with_config(sync)
    }
}

impl std::fmt::Debug for GoogleAdsConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleAdsConnector")
            .field("customer_id", &self.config.customer_id)
            .field("streams", &self.catalog.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Connector for GoogleAdsConnector {
    fn spec(&self) -> ConnectorSpec {
        Self::describe()
    }

    async fn check(&self) -> Result<CheckResult> {
        if let Err(e) = self.config.validate_credentials() {
            return Ok(CheckResult::failure(e.to_string()));
        }
        match self.api.check().await {
            Ok(()) => Ok(CheckResult::success()),
            Err(e) => Ok(CheckResult::failure(e.to_string())),
        }
    }

    async fn discover(&self) -> Result<Vec<StreamDescriptor>> {
        Ok(self.catalog.descriptors())
    }

    async fn read(&self, selection: &[String], sync: SyncConfig) -> Result<MessageStream> {
        for name in selection {
            self.catalog.get(name)?;
        }

        let (tx, rx) = mpsc::channel(READ_BUFFER);
        let engine = self.engine(sync);
        let selection = selection.to_vec();

        tokio::spawn(async move {
            let mut sink = ChannelSink::new(tx.clone());
            let outcome = engine
                .run(&selection, &mut sink)
                .await
                .and_then(crate::engine::RunReport::into_result);
            match outcome {
                Ok(report) => info!(records = report.total_records(), "read finished"),
                Err(e) => {
                    error!(error = %e, "read failed");
                    let _ = tx.send(Err(e)).await;
                }
            }
        });

        Ok(Box::pin(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{table_of, ScriptedApi};
    use crate::api::RequestKind;
    use crate::error::Error;
    use futures::StreamExt;
    use serde_json::json;

    fn scripted(fail_hierarchy: bool) -> Arc<ScriptedApi> {
        Arc::new(ScriptedApi::new(move |req| match (&req.kind, table_of(req)) {
            (RequestKind::ListAccessibleCustomers, _) => {
                vec![Ok(json!({"resourceNames": ["customers/42"]}))]
            }
            (_, Some("customer_client")) if fail_hierarchy => vec![Err(Error::query("bad"))],
            (_, Some("customer_client")) => {
                vec![Ok(json!({"customerClient": {"id": "42", "manager": false}}))]
            }
            (_, Some("campaign")) => vec![Ok(json!({"campaign": {"id": "7", "name": "x"}}))],
            _ => Vec::new(),
        }))
    }

    fn connector(api: Arc<ScriptedApi>) -> GoogleAdsConnector {
        GoogleAdsConnector::with_api(TapConfig::new("42"), api).unwrap()
    }

    #[test]
    fn test_check_result_success() {
        let result = CheckResult::success();
        assert!(result.success);
        assert!(result.message.is_none());
    }

    #[test]
    fn test_check_result_failure() {
        let result = CheckResult::failure("Connection failed");
        assert!(!result.success);
        assert_eq!(result.message, Some("Connection failed".to_string()));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = GoogleAdsConnector::with_api(TapConfig::new(""), scripted(false)).unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { .. }));
    }

    #[test]
    fn test_spec() {
        let spec = connector(scripted(false)).spec();
        assert_eq!(spec.name, "solidafy-googleads");
        assert!(spec.config["properties"]["customer_id"].is_object());
    }

    #[tokio::test]
    async fn test_check_needs_credentials() {
        let result = connector(scripted(false)).check().await.unwrap();
        assert!(!result.success);
        assert!(result.message.unwrap().contains("developer_token"));
    }

    #[tokio::test]
    async fn test_discover() {
        let streams = connector(scripted(false)).discover().await.unwrap();
        assert_eq!(streams.len(), 16);
        assert_eq!(streams[0].name, "stream_accessible_customers");
        assert!(streams[0].parent.is_none());
    }

    #[tokio::test]
    async fn test_read_streams_messages() {
        let stream = connector(scripted(false))
            .read(&["stream_campaign".to_string()], SyncConfig::default())
            .await
            .unwrap();
        let items: Vec<_> = stream.collect().await;

        assert!(items.iter().all(Result::is_ok));
        let records: Vec<_> = items
            .iter()
            .filter_map(|m| m.as_ref().ok())
            .filter(|m| m.is_record())
            .collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].stream(), Some("stream_campaign"));
    }

    #[tokio::test]
    async fn test_read_surfaces_node_failure_last() {
        let stream = connector(scripted(true))
            .read(&[], SyncConfig::default())
            .await
            .unwrap();
        let items: Vec<_> = stream.collect().await;

        let last = items.last().unwrap();
        assert!(matches!(last, Err(Error::StreamsFailed { failed: 1, .. })));
        assert!(items
            .iter()
            .filter_map(|m| m.as_ref().ok())
            .all(|m| m.stream() != Some("stream_campaign")));
    }

    #[tokio::test]
    async fn test_read_pauses_until_consumed() {
        let rows = READ_BUFFER * 3;
        let api = Arc::new(ScriptedApi::new(move |req| match (&req.kind, table_of(req)) {
            (RequestKind::ListAccessibleCustomers, _) => {
                vec![Ok(json!({"resourceNames": ["customers/42"]}))]
            }
            (_, Some("customer_client")) => {
                vec![Ok(json!({"customerClient": {"id": "42", "manager": false}}))]
            }
            (_, Some("campaign")) => (0..rows)
                .map(|i| Ok(json!({"campaign": {"id": i.to_string()}})))
                .collect(),
            _ => Vec::new(),
        }));

        let mut stream = connector(Arc::clone(&api))
            .read(&[], SyncConfig::default())
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        // Stuck on the campaign stream until someone reads
        assert_eq!(api.calls().len(), 3);

        let mut records = 0;
        while let Some(item) = stream.next().await {
            if item.unwrap().stream() == Some("stream_campaign") {
                records += 1;
            }
        }
        assert_eq!(records, rows);
        assert_eq!(api.calls().len(), 16);
    }

    #[tokio::test]
    async fn test_dropped_reader_stops_run() {
        let api = scripted(false);
        let stream = connector(Arc::clone(&api))
            .read(&[], SyncConfig::default())
            .await
            .unwrap();
        drop(stream);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert!(api.calls().len() < 16);
    }

    #[tokio::test]
    async fn test_read_unknown_stream() {
        let err = connector(scripted(false))
            .read(&["nope".to_string()], SyncConfig::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::StreamNotFound { .. }));
    }
}
