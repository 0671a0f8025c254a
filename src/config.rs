//! Connector configuration
//!
//! `TapConfig` is resolved once per run, validated, and then shared read-only
//! by the stream catalog, the API client and the engine.
//!
//! Both the nested form (`{"oauth_credentials": {"client_id": ..}}`) and the
//! dotted form used by older configs (`{"oauth_credentials.client_id": ..}`)
//! are accepted.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, OptionStringExt};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;

/// Default Google Ads REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://googleads.googleapis.com";

/// Default Google Ads API version
pub const DEFAULT_API_VERSION: &str = "v17";

/// Default Google OAuth2 token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// OAuth scope required by the Google Ads API
pub const ADWORDS_SCOPE: &str = "https://www.googleapis.com/auth/adwords";

/// Date format used by config dates and GAQL date literals
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Credentials
// ============================================================================

/// OAuth2 installed-app / web credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthCredentials {
    /// OAuth client id
    #[serde(default)]
    pub client_id: String,
    /// OAuth client secret
    #[serde(default)]
    pub client_secret: String,
    /// Long-lived refresh token
    #[serde(default)]
    pub refresh_token: String,
}

impl OAuthCredentials {
    fn is_complete(&self) -> bool {
        !self.client_id.is_empty()
            && !self.client_secret.is_empty()
            && !self.refresh_token.is_empty()
    }
}

/// Service account credentials for the JWT bearer flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccount {
    /// Service account email (JWT issuer)
    pub client_email: String,
    /// PEM encoded RSA private key
    pub private_key: String,
    /// User to impersonate, if domain-wide delegation is used
    #[serde(default)]
    pub subject: Option<String>,
}

// ============================================================================
// Tap Config
// ============================================================================

/// Complete connector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// Customer (account) id all queries are issued against
    #[serde(default)]
    pub customer_id: String,

    /// Developer token sent with every API request
    #[serde(default)]
    pub developer_token: String,

    /// Manager account id used as `login-customer-id`
    #[serde(default)]
    pub login_customer_id: Option<String>,

    /// OAuth2 refresh-token credentials
    #[serde(default)]
    pub oauth_credentials: OAuthCredentials,

    /// Service account credentials (used instead of OAuth2 when present)
    #[serde(default)]
    pub service_account: Option<ServiceAccount>,

    /// Lookback for performance reports, in days
    #[serde(default = "default_interval_days")]
    pub performance_report_interval_days: u32,

    /// Fixed start date for reports bound to the configured start
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Fixed end date; today when absent
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API version path segment
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// OAuth2 token endpoint
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Client-side request rate limit
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Retries for transient HTTP failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_interval_days() -> u32 {
    30
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_max_retries() -> u32 {
    3
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            customer_id: String::new(),
            developer_token: String::new(),
            login_customer_id: None,
            oauth_credentials: OAuthCredentials::default(),
            service_account: None,
            performance_report_interval_days: default_interval_days(),
            start_date: None,
            end_date: None,
            base_url: default_base_url(),
            api_version: default_api_version(),
            token_url: default_token_url(),
            requests_per_second: default_requests_per_second(),
            max_retries: default_max_retries(),
        }
    }
}

impl TapConfig {
    /// Create a config for a single customer with defaults everywhere else
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            ..Default::default()
        }
    }

    /// Set the lookback window
    #[must_use]
    pub fn with_interval_days(mut self, days: u32) -> Self {
        self.performance_report_interval_days = days;
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Build from a JSON value, accepting dotted keys, and validate
    pub fn from_value(value: JsonValue) -> Result<Self> {
        let value = match value {
            JsonValue::Object(map) => JsonValue::Object(expand_dotted_keys(map)),
            JsonValue::Null => JsonValue::Object(JsonObject::new()),
            _ => return Err(Error::config("Config must be a JSON object")),
        };

        let mut config: TapConfig = serde_json::from_value(value)
            .map_err(|e| Error::config(format!("Invalid config: {e}")))?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON string
    pub fn from_json(json_str: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json_str)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Load and validate a JSON config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::config(format!("Failed to read config file: {e}")))?;
        Self::from_json(&content)
    }

    /// Strip formatting from account ids and drop empty optionals
    fn normalize(&mut self) {
        self.customer_id = normalize_customer_id(&self.customer_id);
        self.login_customer_id = self
            .login_customer_id
            .take()
            .none_if_empty()
            .map(|id| normalize_customer_id(&id));
        self.base_url = self.base_url.trim_end_matches('/').to_string();
    }

    /// Check the values the graph depends on
    pub fn validate(&self) -> Result<()> {
        if self.customer_id.is_empty() {
            return Err(Error::missing_field("customer_id"));
        }
        if !self.customer_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::invalid_value(
                "customer_id",
                format!("expected digits, got '{}'", self.customer_id),
            ));
        }
        if let Some(login) = &self.login_customer_id {
            if !login.chars().all(|c| c.is_ascii_digit()) {
                return Err(Error::invalid_value(
                    "login_customer_id",
                    format!("expected digits, got '{login}'"),
                ));
            }
        }
        if self.performance_report_interval_days == 0 {
            return Err(Error::invalid_value(
                "performance_report_interval_days",
                "must be greater than zero",
            ));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(Error::invalid_value(
                    "start_date",
                    format!("{start} is after end_date {end}"),
                ));
            }
        }
        url::Url::parse(&self.base_url)?;
        Ok(())
    }

    /// Check that credentials for live API access are present
    pub fn validate_credentials(&self) -> Result<()> {
        if self.developer_token.is_empty() {
            return Err(Error::missing_field("developer_token"));
        }
        if self.service_account.is_none() && !self.oauth_credentials.is_complete() {
            return Err(Error::missing_field(
                "oauth_credentials (client_id, client_secret, refresh_token)",
            ));
        }
        Ok(())
    }

    /// Config values exposed to templates (secrets excluded)
    pub fn template_values(&self) -> JsonValue {
        json!({
            "customer_id": self.customer_id,
            "login_customer_id": self.login_customer_id,
            "api_version": self.api_version,
            "performance_report_interval_days": self.performance_report_interval_days,
        })
    }

    /// Description of the accepted properties
    pub fn spec() -> JsonValue {
        json!({
            "type": "object",
            "required": ["customer_id", "developer_token"],
            "properties": {
                "customer_id": {"type": "string", "title": "Customer ID"},
                "developer_token": {"type": "string", "secret": true},
                "login_customer_id": {"type": "string", "title": "Manager account ID"},
                "oauth_credentials.client_id": {"type": "string"},
                "oauth_credentials.client_secret": {"type": "string", "secret": true},
                "oauth_credentials.refresh_token": {"type": "string", "secret": true},
                "service_account": {
                    "type": "object",
                    "properties": {
                        "client_email": {"type": "string"},
                        "private_key": {"type": "string", "secret": true},
                        "subject": {"type": "string"}
                    }
                },
                "performance_report_interval_days": {"type": "integer", "default": default_interval_days()},
                "start_date": {"type": "string", "format": "date"},
                "end_date": {"type": "string", "format": "date"},
                "base_url": {"type": "string", "default": DEFAULT_BASE_URL},
                "api_version": {"type": "string", "default": DEFAULT_API_VERSION},
                "token_url": {"type": "string", "default": DEFAULT_TOKEN_URL},
                "requests_per_second": {"type": "integer", "default": default_requests_per_second()},
                "max_retries": {"type": "integer", "default": default_max_retries()}
            }
        })
    }
}

/// Remove dashes and whitespace: "123-456-7890" -> "1234567890"
pub fn normalize_customer_id(id: &str) -> String {
    id.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

/// Turn `{"a.b": 1}` into `{"a": {"b": 1}}`, merging with existing objects
fn expand_dotted_keys(map: JsonObject) -> JsonObject {
    let mut out = JsonObject::new();
    for (key, value) in map {
        let parts: Vec<&str> = key.split('.').collect();
        insert_path(&mut out, &parts, value);
    }
    out
}

fn insert_path(target: &mut JsonObject, parts: &[&str], value: JsonValue) {
    match parts {
        [] => {}
        [last] => match (target.get_mut(*last), value) {
            (Some(JsonValue::Object(existing)), JsonValue::Object(incoming)) => {
                for (k, v) in incoming {
                    existing.insert(k, v);
                }
            }
            (_, value) => {
                target.insert((*last).to_string(), value);
            }
        },
        [head, rest @ ..] => {
            let entry = target
                .entry((*head).to_string())
                .or_insert_with(|| JsonValue::Object(JsonObject::new()));
            if !entry.is_object() {
                *entry = JsonValue::Object(JsonObject::new());
            }
            if let JsonValue::Object(child) = entry {
                insert_path(child, rest, value);
            }
        }
    }
}
