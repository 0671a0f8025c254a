//! CLI runner - executes commands

use crate::cli::commands::{parse_stream_list, Cli, Commands, OutputFormat};
use crate::config::TapConfig;
use crate::connector::{Connector, GoogleAdsConnector};
use crate::engine::{Message, SyncConfig};
use crate::error::{Error, Result, ResultExt};
use crate::output::{JsonLinesSink, RecordSink};
use crate::stream::google_ads_catalog;
use serde_json::{json, Value};
use std::io::BufWriter;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Spec => self.spec(),
            Commands::Check => self.check().await,
            Commands::Discover => self.discover().await,
            Commands::Streams => self.streams(),
            Commands::Read {
                streams,
                max_records,
                fail_fast,
                check_duplicate_keys,
            } => {
                let sync = SyncConfig::new()
                    .with_fail_fast(*fail_fast)
                    .with_max_records(max_records.unwrap_or(0))
                    .with_duplicate_key_check(*check_duplicate_keys);
                self.read(streams.as_deref(), sync).await
            }
        }
    }

    /// Load configuration; inline JSON wins over the file
    fn load_config(&self) -> Result<TapConfig> {
        if let Some(json_str) = &self.cli.config_json {
            return TapConfig::from_json(json_str);
        }
        if let Some(path) = &self.cli.config {
            return TapConfig::from_file(path)
                .with_context(|| format!("Config file {}", path.display()));
        }
        Err(Error::config(
            "No configuration given (use --config or --config-json)",
        ))
    }

    fn connector(&self) -> Result<GoogleAdsConnector> {
        GoogleAdsConnector::new(self.load_config()?)
    }

    /// Show connector specification
    fn spec(&self) -> Result<()> {
        let spec = GoogleAdsConnector::describe();
        self.output_message(&json!({
            "type": "SPEC",
            "spec": {
                "name": spec.name,
                "title": spec.title,
                "description": spec.description,
                "connectionSpecification": spec.config,
            }
        }));
        Ok(())
    }

    /// Check connection
    async fn check(&self) -> Result<()> {
        let connector = self.connector()?;
        self.output_message(&Message::info(format!(
            "Checking connection for customer {}",
            connector.config().customer_id
        ))
        .to_json());

        let result = connector.check().await?;
        let (status, message) = if result.success {
            ("SUCCEEDED", "Connection successful".to_string())
        } else {
            (
                "FAILED",
                format!(
                    "Connection failed: {}",
                    result.message.unwrap_or_default()
                ),
            )
        };

        self.output_message(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": {"status": status, "message": message}
        }));
        Ok(())
    }

    /// Describe streams
    async fn discover(&self) -> Result<()> {
        let connector = self.connector()?;
        let streams = connector.discover().await?;
        self.output_message(&json!({
            "type": "CATALOG",
            "catalog": {"streams": streams}
        }));
        Ok(())
    }

    /// List stream names; no config needed
    fn streams(&self) -> Result<()> {
        let catalog = google_ads_catalog(&TapConfig::default())?;
        self.output_message(&json!({
            "type": "STREAMS",
            "streams": catalog.names(),
        }));
        Ok(())
    }

    /// Read data; fails when any stream invocation failed
    async fn read(&self, streams: Option<&str>, sync: SyncConfig) -> Result<()> {
        let connector = self.connector()?;
        connector.config().validate_credentials()?;

        let selection = parse_stream_list(streams);

        let mut sink = JsonLinesSink::new(BufWriter::new(std::io::stdout()))
            .pretty(self.cli.format == OutputFormat::Pretty);
        let report = connector.engine(sync).run(&selection, &mut sink).await?;

        info!(
            records = report.total_records(),
            failures = report.failures.len(),
            "read complete"
        );
        sink.emit(Message::info(format!("Run summary: {}", report.to_json())))
            .await?;
        sink.flush().await?;

        report.into_result().map(|_| ())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
