//! Error types for the Google Ads connector
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Every error can be classified into an [`ErrorKind`], which is what the
//! engine uses to decide whether a failure is row-local, node-local or fatal
//! for the whole run.

use thiserror::Error;

/// The main error type for the connector
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Token refresh failed: {message}")]
    TokenRefresh { message: String },

    #[error("JWT generation failed: {message}")]
    JwtGeneration { message: String },

    #[error("OAuth2 error: {message}")]
    OAuth2 { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // API Errors
    // ============================================================================
    #[error("Query rejected: {message}")]
    Query { message: String },

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("JSONPath error: {message}")]
    JsonPath { message: String },

    #[error("Failed to extract records from path '{path}': {message}")]
    RecordExtraction { path: String, message: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Record in stream '{stream}' is missing primary key field '{field}'")]
    Identity { stream: String, field: String },

    // ============================================================================
    // Stream Graph Errors
    // ============================================================================
    #[error("Stream '{stream}' not found in catalog")]
    StreamNotFound { stream: String },

    #[error("Invalid stream catalog: {message}")]
    Catalog { message: String },

    #[error("{failed} stream invocation(s) failed, first was {first}")]
    StreamsFailed { failed: usize, first: String },

    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // Template Errors
    // ============================================================================
    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Undefined variable in template: {variable}")]
    UndefinedVariable { variable: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Classification of an error by how far it propagates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Credentials invalid or expired; fatal for the whole run
    Auth,
    /// The platform rejected a query; fatal for the node and its subtree
    Query,
    /// Retry budget exhausted on a retryable condition; fatal for the node
    Transient,
    /// A row lacks a primary key field; fatal for that row only
    Identity,
    /// Invalid configuration or catalog, raised before any node runs
    Config,
    /// Anything else (decode failures, I/O, template bugs)
    Internal,
}

impl ErrorKind {
    /// Short uppercase label used in log and report output
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "AUTH",
            Self::Query => "QUERY",
            Self::Transient => "TRANSIENT",
            Self::Identity => "IDENTITY",
            Self::Config => "CONFIG",
            Self::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a query rejection error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a JSONPath error
    pub fn json_path(message: impl Into<String>) -> Self {
        Self::JsonPath {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an identity error
    pub fn identity(stream: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Identity {
            stream: stream.into(),
            field: field.into(),
        }
    }

    /// Create a catalog error
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create a template error
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Create an undefined variable error
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Auth { .. }
            | Error::TokenRefresh { .. }
            | Error::JwtGeneration { .. }
            | Error::OAuth2 { .. } => ErrorKind::Auth,

            Error::HttpStatus { status: 401, .. } => ErrorKind::Auth,
            Error::HttpStatus { status, .. } if is_retryable_status(*status) => {
                ErrorKind::Transient
            }
            Error::HttpStatus { status, .. } if (400..500).contains(status) => ErrorKind::Query,
            Error::Query { .. } => ErrorKind::Query,

            Error::Http(_)
            | Error::RateLimited { .. }
            | Error::Timeout { .. }
            | Error::MaxRetriesExceeded { .. } => ErrorKind::Transient,

            Error::Identity { .. } => ErrorKind::Identity,

            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::InvalidConfigValue { .. }
            | Error::StreamNotFound { .. }
            | Error::Catalog { .. }
            | Error::InvalidUrl(_) => ErrorKind::Config,

            _ => ErrorKind::Internal,
        }
    }

    /// Whether this error must abort the whole run rather than one node
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(self.kind(), ErrorKind::Auth | ErrorKind::Config)
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for the connector
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("customer_id");
        assert_eq!(err.to_string(), "Missing required config field: customer_id");

        let err = Error::identity("stream_campaign", "campaign__id");
        assert_eq!(
            err.to_string(),
            "Record in stream 'stream_campaign' is missing primary key field 'campaign__id'"
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::RateLimited {
            retry_after_seconds: 60
        }
        .is_retryable());
        assert!(Error::Timeout { timeout_ms: 1000 }.is_retryable());
        assert!(Error::http_status(429, "").is_retryable());
        assert!(Error::http_status(503, "").is_retryable());

        assert!(!Error::http_status(400, "").is_retryable());
        assert!(!Error::http_status(401, "").is_retryable());
        assert!(!Error::query("bad gaql").is_retryable());
    }

    #[test_case(Error::auth("expired") => ErrorKind::Auth; "auth")]
    #[test_case(Error::TokenRefresh { message: "x".into() } => ErrorKind::Auth; "token refresh")]
    #[test_case(Error::http_status(401, "") => ErrorKind::Auth; "unauthorized")]
    #[test_case(Error::http_status(400, "") => ErrorKind::Query; "bad request")]
    #[test_case(Error::http_status(403, "") => ErrorKind::Query; "forbidden")]
    #[test_case(Error::query("unrecognized field") => ErrorKind::Query; "query")]
    #[test_case(Error::http_status(503, "") => ErrorKind::Transient; "unavailable")]
    #[test_case(Error::MaxRetriesExceeded { max_retries: 3 } => ErrorKind::Transient; "retries")]
    #[test_case(Error::identity("s", "f") => ErrorKind::Identity; "identity")]
    #[test_case(Error::missing_field("customer_id") => ErrorKind::Config; "config")]
    #[test_case(Error::decode("garbage") => ErrorKind::Internal; "decode")]
    fn test_error_kind(err: Error) -> ErrorKind {
        err.kind()
    }

    #[test]
    fn test_fatal_for_run() {
        assert!(Error::auth("expired").is_fatal_for_run());
        assert!(!Error::query("bad").is_fatal_for_run());
        assert!(!Error::Timeout { timeout_ms: 10 }.is_fatal_for_run());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
