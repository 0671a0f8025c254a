//! Authenticator implementation
//!
//! Applies credentials to requests and keeps the access token fresh.

use super::types::{AuthConfig, CachedToken};
use crate::error::{Error, Result};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Authenticator handles applying authentication to HTTP requests
pub struct Authenticator {
    config: AuthConfig,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    http_client: Client,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create an authenticator sharing an existing HTTP client
    pub fn with_client(config: AuthConfig, http_client: Client) -> Self {
        Self {
            config,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Apply authentication to a request builder
    pub async fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        match &self.config {
            AuthConfig::None => Ok(req),
            AuthConfig::Bearer { token } => Ok(req.bearer_auth(token)),
            AuthConfig::Oauth2Refresh { .. } | AuthConfig::ServiceAccount { .. } => {
                let token = self.access_token().await?;
                Ok(req.bearer_auth(token))
            }
        }
    }

    /// Get a valid access token, refreshing if necessary
    pub async fn access_token(&self) -> Result<String> {
        if let AuthConfig::Bearer { token } = &self.config {
            return Ok(token.clone());
        }

        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
                return Ok(token.token.clone());
            }
        }

        let mut cached = self.cached_token.write().await;

        // Another task may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
            return Ok(token.token.clone());
        }

        let fresh = self.fetch_new_token().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    async fn fetch_new_token(&self) -> Result<CachedToken> {
        match &self.config {
            AuthConfig::Oauth2Refresh {
                token_url,
                client_id,
                client_secret,
                refresh_token,
            } => {
                self.fetch_oauth2_refresh(token_url, client_id, client_secret, refresh_token)
                    .await
            }
            AuthConfig::ServiceAccount {
                client_email,
                subject,
                private_key,
                scope,
                token_url,
                lifetime_seconds,
            } => {
                let assertion = sign_assertion(
                    client_email,
                    subject.as_deref(),
                    private_key,
                    scope,
                    token_url,
                    *lifetime_seconds,
                )?;
                self.exchange_assertion(token_url, &assertion).await
            }
            AuthConfig::None | AuthConfig::Bearer { .. } => Err(Error::auth(
                "Token refresh not supported for this auth type",
            )),
        }
    }

    async fn fetch_oauth2_refresh(
        &self,
        token_url: &str,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<CachedToken> {
        debug!(token_url, "refreshing OAuth2 access token");
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
        ];

        let response = self.http_client.post(token_url).form(&form).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TokenRefresh {
                message: format!("Refresh token request failed with status {status}: {body}"),
            });
        }

        let token_response: TokenResponse = response.json().await?;
        Ok(token_response.into_cached_token())
    }

    async fn exchange_assertion(&self, token_url: &str, assertion: &str) -> Result<CachedToken> {
        debug!(token_url, "exchanging service account assertion");
        let form = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion)];

        let response = self.http_client.post(token_url).form(&form).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::JwtGeneration {
                message: format!("JWT token exchange failed with status {status}: {body}"),
            });
        }

        let token_response: TokenResponse = response.json().await?;
        Ok(token_response.into_cached_token())
    }

    /// Drop the cached token so the next request fetches a new one
    pub async fn clear_cache(&self) {
        *self.cached_token.write().await = None;
    }

    /// Get the current auth config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let flow = match self.config {
            AuthConfig::None => "none",
            AuthConfig::Bearer { .. } => "bearer",
            AuthConfig::Oauth2Refresh { .. } => "oauth2_refresh",
            AuthConfig::ServiceAccount { .. } => "service_account",
        };
        f.debug_struct("Authenticator")
            .field("flow", &flow)
            .finish_non_exhaustive()
    }
}

/// Sign an RS256 service account assertion
pub fn sign_assertion(
    client_email: &str,
    subject: Option<&str>,
    private_key: &str,
    scope: &str,
    audience: &str,
    lifetime_seconds: u64,
) -> Result<String> {
    let now = Utc::now().timestamp();
    let lifetime = i64::try_from(lifetime_seconds).unwrap_or(i64::MAX / 2);

    let claims = JwtClaims {
        iss: client_email.to_string(),
        sub: subject.map(String::from),
        scope: scope.to_string(),
        aud: audience.to_string(),
        iat: now,
        exp: now + lifetime,
    };

    let key = EncodingKey::from_rsa_pem(private_key.as_bytes()).map_err(|e| {
        Error::JwtGeneration {
            message: format!("Invalid private key: {e}"),
        }
    })?;

    encode(&Header::new(Algorithm::RS256), &claims, &key).map_err(|e| Error::JwtGeneration {
        message: format!("Failed to encode JWT: {e}"),
    })
}

/// OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_cached_token(self) -> CachedToken {
        match self.expires_in {
            Some(secs) => CachedToken::expires_in(self.access_token, secs),
            None => CachedToken::new(self.access_token, None),
        }
    }
}

#[derive(Debug, Serialize)]
struct JwtClaims {
    iss: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}
