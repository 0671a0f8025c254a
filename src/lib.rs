//! # Solidafy Google Ads Connector
//!
//! A Rust-native source connector for the Google Ads API.
//!
//! ## Features
//!
//! - **Stream Graph**: account discovery seeds the customer hierarchy, which
//!   fans out to every report stream
//! - **Fan-out Deduplication**: each child runs once per distinct context
//! - **GAQL Reports**: one query template per report, with a rolling date
//!   window recomputed at execution time
//! - **Flat Records**: nested rows flattened with `__` and keyed by a
//!   composite primary key
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use solidafy_googleads::connector::{Connector, GoogleAdsConnector};
//! use solidafy_googleads::config::TapConfig;
//! use solidafy_googleads::engine::SyncConfig;
//!
//! #[tokio::main]
//! async fn main() -> solidafy_googleads::Result<()> {
//!     let config = TapConfig::from_file("config.json")?;
//!     let connector = GoogleAdsConnector::new(config)?;
//!
//!     let status = connector.check().await?;
//!     let streams = connector.discover().await?;
//!
//!     let mut messages = connector.read(&[], SyncConfig::default()).await?;
//!     while let Some(msg) = messages.next().await {
//!         // Process messages
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Connector Interface                         │
//! │  spec()    check()    discover() → streams    read() → messages │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴──────────┬───────────────────────┐
//! │   Stream     │        Engine            │       Output          │
//! ├──────────────┼──────────────────────────┼───────────────────────┤
//! │ Catalog      │ Depth-first traversal    │ JSON lines            │
//! │ Query        │ Context dedup            │ Memory                │
//! │ Record       │ Failure isolation        │ Channel               │
//! └──────────────┴──────────────────────────┴───────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┐
//! │   Auth   │   HTTP    │   Paginate    │  Decode   │
//! ├──────────┼───────────┼───────────────┼───────────┤
//! │ OAuth2   │ Retry     │ Page token    │ JSONPath  │
//! │ Svc acct │ Rate Limit│               │           │
//! └──────────┴───────────┴───────────────┴───────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the connector
pub mod error;

/// Common types and type aliases
pub mod types;

/// Authentication implementations
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Pagination strategies
pub mod pagination;

/// Response decoders
pub mod decode;

/// Google Ads API client
pub mod api;

/// Connector configuration
pub mod config;

/// Template interpolation
pub mod template;

/// GAQL report templates and date windows
pub mod query;

/// Parent-to-child stream contexts
pub mod context;

/// Row flattening and record identity
pub mod record;

/// Stream nodes and the catalog forest
pub mod stream;

/// Main execution engine
pub mod engine;

/// Message sinks
pub mod output;

/// Connector trait and implementation
pub mod connector;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use connector::{Connector, GoogleAdsConnector};
pub use engine::{RunReport, SyncConfig, SyncEngine};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
