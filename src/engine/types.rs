//! Engine types
//!
//! Message types, run configuration and the run report.

use crate::error::{Error, ErrorKind, Result};
use crate::record::{PrimaryKey, Record, RowError};
use crate::types::{JsonObject, JsonValue, LogLevel};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;

/// A message emitted during a run
#[derive(Debug, Clone)]
pub enum Message {
    /// One record
    Record {
        /// Stream name
        stream: String,
        /// Flattened fields
        data: JsonObject,
        /// Primary key tuple
        primary_key: PrimaryKey,
        /// Declared schema reference
        schema: String,
        /// When the record was emitted
        emitted_at: DateTime<Utc>,
    },
    /// Log message
    Log {
        /// Log level
        level: LogLevel,
        /// Log message
        message: String,
    },
}

impl Message {
    /// Create a record message
    pub fn record(stream: impl Into<String>, schema: impl Into<String>, record: Record) -> Self {
        let primary_key = record.primary_key().clone();
        Self::Record {
            stream: stream.into(),
            data: record.into_fields(),
            primary_key,
            schema: schema.into(),
            emitted_at: Utc::now(),
        }
    }

    /// Create a log message
    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        Self::Log {
            level,
            message: message.into(),
        }
    }

    /// Create an info log
    pub fn info(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Info, message)
    }

    /// Create a warning log
    pub fn warn(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Warn, message)
    }

    /// Create an error log
    pub fn error(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Error, message)
    }

    /// Check if this is a record message
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// Check if this is a log message
    pub fn is_log(&self) -> bool {
        matches!(self, Self::Log { .. })
    }

    /// Stream name, for record messages
    pub fn stream(&self) -> Option<&str> {
        match self {
            Self::Record { stream, .. } => Some(stream),
            Self::Log { .. } => None,
        }
    }

    /// Protocol form, one JSON object per message
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Record {
                stream,
                data,
                primary_key,
                schema,
                emitted_at,
            } => json!({
                "type": "RECORD",
                "record": {
                    "stream": stream,
                    "data": data,
                    "primary_key": primary_key,
                    "schema_ref": schema,
                    "emitted_at": emitted_at.timestamp_millis(),
                }
            }),
            Self::Log { level, message } => json!({
                "type": "LOG",
                "log": {"level": level.as_str(), "message": message}
            }),
        }
    }
}

/// Configuration for a run
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    /// Abort the whole run on the first node failure
    pub fail_fast: bool,
    /// Maximum records emitted per stream (0 = unlimited)
    pub max_records_per_stream: usize,
    /// Remember emitted keys and warn when a stream repeats one
    pub check_duplicate_keys: bool,
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set fail fast mode
    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Set max records per stream
    #[must_use]
    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records_per_stream = max;
        self
    }

    /// Warn on repeated primary keys within a stream
    ///
    /// Keeps every emitted key for the run, so memory grows with output.
    #[must_use]
    pub fn with_duplicate_key_check(mut self, check: bool) -> Self {
        self.check_duplicate_keys = check;
        self
    }

    pub(crate) fn limit_reached(&self, emitted: usize) -> bool {
        self.max_records_per_stream > 0 && emitted >= self.max_records_per_stream
    }
}

/// A node invocation that failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFailure {
    /// Stream name
    pub stream: String,
    /// Error class
    pub kind: ErrorKind,
    /// Error message
    pub message: String,
    /// Context the node was invoked with
    pub context: String,
}

/// A row that could not become a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityFailure {
    /// Stream name
    pub stream: String,
    /// 1-based row position within the invocation
    pub row: usize,
    /// What was wrong with the row
    pub error: RowError,
}

impl IdentityFailure {
    /// The missing key field, if that was the problem
    pub fn field(&self) -> Option<&str> {
        self.error.field()
    }
}

/// Per-stream counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Times the node was invoked
    pub invocations: usize,
    /// Records emitted
    pub records: usize,
    /// Emitted records whose key the stream had already emitted
    pub duplicate_keys: usize,
}

/// Outcome of a run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Counters keyed by stream name
    pub streams: BTreeMap<String, StreamStats>,
    /// Node failures, in the order they happened
    pub failures: Vec<NodeFailure>,
    /// Row-local failures
    pub identity_failures: Vec<IdentityFailure>,
    /// Wall time of the run
    pub duration: Duration,
}

impl RunReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Records emitted for a stream
    pub fn records(&self, stream: &str) -> usize {
        self.streams.get(stream).map_or(0, |s| s.records)
    }

    /// Invocations of a stream
    pub fn invocations(&self, stream: &str) -> usize {
        self.streams.get(stream).map_or(0, |s| s.invocations)
    }

    /// Records emitted across all streams
    pub fn total_records(&self) -> usize {
        self.streams.values().map(|s| s.records).sum()
    }

    /// Whether every invocation succeeded
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn recorded node failures into an error
    pub fn into_result(self) -> Result<Self> {
        match self.failures.first() {
            None => Ok(self),
            Some(first) => Err(Error::StreamsFailed {
                failed: self.failures.len(),
                first: format!("{}: {}", first.stream, first.message),
            }),
        }
    }

    pub(crate) fn stream_mut(&mut self, stream: &str) -> &mut StreamStats {
        self.streams.entry(stream.to_string()).or_default()
    }

    /// Summary object printed at the end of a CLI run
    pub fn to_json(&self) -> JsonValue {
        json!({
            "streams": self.streams.iter().map(|(name, s)| {
                (name.clone(), json!({
                    "invocations": s.invocations,
                    "records": s.records,
                    "duplicate_keys": s.duplicate_keys,
                }))
            }).collect::<JsonObject>(),
            "total_records": self.total_records(),
            "failures": self.failures.iter().map(|f| json!({
                "stream": f.stream,
                "kind": f.kind.as_str(),
                "message": f.message,
                "context": f.context,
            })).collect::<Vec<_>>(),
            "identity_failures": self.identity_failures.iter().map(|f| json!({
                "stream": f.stream,
                "row": f.row,
                "field": f.field(),
                "message": f.error.to_string(),
            })).collect::<Vec<_>>(),
            "duration_ms": u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX),
        })
    }
}
