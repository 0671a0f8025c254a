//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Google Ads source connector
#[derive(Parser, Debug)]
#[command(name = "solidafy-googleads")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline config JSON (takes precedence over --config)
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Show connector specification
    Spec,

    /// Test connection to the API
    Check,

    /// Describe every stream
    Discover,

    /// List available stream names
    Streams,

    /// Read data from streams
    Read {
        /// Streams to sync (comma-separated, empty = all)
        #[arg(long)]
        streams: Option<String>,

        /// Maximum records per stream
        #[arg(long)]
        max_records: Option<usize>,

        /// Abort on the first stream failure
        #[arg(long)]
        fail_fast: bool,

        /// Warn when a stream emits the same primary key twice
        #[arg(long)]
        check_duplicate_keys: bool,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

/// Split a comma-separated stream list, dropping blanks
pub fn parse_stream_list(streams: Option<&str>) -> Vec<String> {
    streams
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(None => Vec::<String>::new(); "absent")]
    #[test_case(Some("") => Vec::<String>::new(); "empty")]
    #[test_case(Some("stream_ads") => vec!["stream_ads".to_string()]; "single")]
    #[test_case(Some(" stream_ads , stream_campaign,") => vec!["stream_ads".to_string(), "stream_campaign".to_string()]; "padded")]
    fn test_parse_stream_list(input: Option<&str>) -> Vec<String> {
        parse_stream_list(input)
    }

    #[test]
    fn test_parse_read() {
        let cli = Cli::try_parse_from([
            "solidafy-googleads",
            "--config-json",
            r#"{"customer_id": "1"}"#,
            "read",
            "--streams",
            "stream_ads",
            "--max-records",
            "10",
            "--fail-fast",
            "--check-duplicate-keys",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Commands::Read {
                streams: Some("stream_ads".into()),
                max_records: Some(10),
                fail_fast: true,
                check_duplicate_keys: true,
            }
        );
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.config_json.is_some());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["solidafy-googleads", "discover", "--format", "pretty", "-v"])
                .unwrap();
        assert_eq!(cli.command, Commands::Discover);
        assert_eq!(cli.format, OutputFormat::Pretty);
        assert!(cli.verbose);
    }
}
