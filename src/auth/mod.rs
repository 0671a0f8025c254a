//! Authentication module
//!
//! Supports the two Google credential flows: OAuth2 refresh tokens and
//! service account JWT assertions. A fixed bearer token and no auth are
//! available for tests and proxies.
//!
//! The `Authenticator` caches the access token and refreshes it shortly
//! before it expires.

mod authenticator;
mod types;

pub use authenticator::{sign_assertion, Authenticator};
pub use types::{AuthConfig, CachedToken, DEFAULT_JWT_LIFETIME_SECONDS};
