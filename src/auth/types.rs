//! Auth configuration types
//!
//! Resolved from `TapConfig` once per run.

use crate::config::{TapConfig, ADWORDS_SCOPE};
use chrono::{DateTime, Utc};

/// Default lifetime requested for service account assertions
pub const DEFAULT_JWT_LIFETIME_SECONDS: u64 = 3600;

/// Authentication configuration
#[derive(Debug, Clone, Default)]
pub enum AuthConfig {
    /// No authentication (mock servers, tests)
    #[default]
    None,

    /// Fixed bearer token
    Bearer {
        /// The bearer token
        token: String,
    },

    /// OAuth2 refresh token flow
    Oauth2Refresh {
        /// Token endpoint URL
        token_url: String,
        /// Client ID
        client_id: String,
        /// Client secret
        client_secret: String,
        /// Refresh token
        refresh_token: String,
    },

    /// Service account JWT bearer flow
    ServiceAccount {
        /// Service account email (iss claim)
        client_email: String,
        /// User to impersonate (sub claim)
        subject: Option<String>,
        /// PEM encoded RSA private key
        private_key: String,
        /// Requested scope
        scope: String,
        /// Token endpoint, also the aud claim
        token_url: String,
        /// Assertion lifetime in seconds
        lifetime_seconds: u64,
    },
}

impl AuthConfig {
    /// Pick the credential flow configured for this run
    ///
    /// A service account wins over OAuth2 credentials when both are present.
    pub fn from_tap_config(config: &TapConfig) -> Self {
        if let Some(account) = &config.service_account {
            return Self::ServiceAccount {
                client_email: account.client_email.clone(),
                subject: account.subject.clone(),
                private_key: account.private_key.clone(),
                scope: ADWORDS_SCOPE.to_string(),
                token_url: config.token_url.clone(),
                lifetime_seconds: DEFAULT_JWT_LIFETIME_SECONDS,
            };
        }

        let creds = &config.oauth_credentials;
        if creds.refresh_token.is_empty() {
            return Self::None;
        }
        Self::Oauth2Refresh {
            token_url: config.token_url.clone(),
            client_id: creds.client_id.clone(),
            client_secret: creds.client_secret.clone(),
            refresh_token: creds.refresh_token.clone(),
        }
    }

    /// Whether this flow exchanges credentials for short-lived tokens
    pub fn needs_token(&self) -> bool {
        matches!(self, Self::Oauth2Refresh { .. } | Self::ServiceAccount { .. })
    }
}

/// Cached token with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(token: String, seconds: i64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(seconds);
        Self {
            token,
            expires_at: Some(expires_at),
        }
    }

    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + chrono::Duration::seconds(30) >= expires_at,
            None => false,
        }
    }
}
