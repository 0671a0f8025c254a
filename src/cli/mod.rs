//! CLI module
//!
//! Command-line interface for the connector.
//!
//! # Commands
//!
//! - `spec` - Show accepted configuration
//! - `check` - Test connection to the API
//! - `discover` - Describe every stream
//! - `streams` - List stream names (lightweight)
//! - `read` - Extract data from streams

mod commands;
mod runner;

pub use commands::{parse_stream_list, Cli, Commands, OutputFormat};
pub use runner::Runner;
