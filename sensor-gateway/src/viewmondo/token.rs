//! Password-grant token exchange.

use chrono::Utc;
use tracing::debug;

use crate::config::Credentials;
use crate::upstream::UpstreamClient;

use super::error::ViewMondoError;
use super::types::{AccessToken, TokenResponse};

/// Exchanges the configured credentials for a bearer token.
///
/// Every call performs a fresh exchange; tokens are never cached.
#[derive(Debug, Clone)]
pub struct TokenProvider {
    upstream: UpstreamClient,
    token_url: String,
    credentials: Credentials,
}

impl TokenProvider {
    pub fn new(upstream: UpstreamClient, base_url: &str, credentials: Credentials) -> Self {
        Self {
            upstream,
            token_url: format!("{}/Token", base_url.trim_end_matches('/')),
            credentials,
        }
    }

    /// Perform the exchange. No retries.
    pub async fn acquire_token(&self) -> Result<AccessToken, ViewMondoError> {
        let form = [
            ("grant_type", "password"),
            ("username", self.credentials.username.as_str()),
            ("password", self.credentials.password.as_str()),
        ];

        let response: TokenResponse = self
            .upstream
            .fetch_json(self.upstream.post(&self.token_url).form(&form))
            .await
            .map_err(ViewMondoError::at_token)?;

        if response.access_token.is_empty() {
            return Err(ViewMondoError::Auth {
                reason: "token response carried no access_token".to_string(),
            });
        }

        debug!(expires_in = ?response.expires_in, "obtained ViewMondo token");
        Ok(AccessToken::new(response.access_token, Utc::now()))
    }
}
