//! OAuth token acquisition for the calendar provider
//!
//! Ordinary cached-resource acquisition: reuse the access token while it is
//! still valid, otherwise post a `refresh_token` grant to the token
//! endpoint. Credential storage and the initial consent flow are external
//! collaborators; this module only needs a long-lived refresh token from
//! configuration.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use skyfit_domain::constants::TOKEN_REFRESH_MARGIN_SECS;
use skyfit_domain::{OAuthConfig, Result, SkyfitError};
use tokio::sync::Mutex;
use tracing::debug;

/// Supplies a bearer token for calendar API calls.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// Fixed token, for tests and short-lived scripted runs.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Token provider that refreshes via the OAuth `refresh_token` grant and
/// caches the result until shortly before expiry.
pub struct RefreshingTokenProvider {
    client: reqwest::Client,
    config: OAuthConfig,
    refresh_margin: Duration,
    cached: Mutex<Option<CachedToken>>,
}

impl RefreshingTokenProvider {
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            refresh_margin: Duration::from_secs(TOKEN_REFRESH_MARGIN_SECS.unsigned_abs()),
            cached: Mutex::new(None),
        }
    }

    /// Override the refresh margin (primarily for tests).
    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    async fn refresh(&self) -> Result<CachedToken> {
        let response = self
            .client
            .post(&self.config.token_endpoint)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", self.config.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| SkyfitError::Auth(format!("token refresh request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(SkyfitError::Auth(format!("token refresh failed ({status}): {body}")));
        }

        let refreshed: TokenRefreshResponse = response
            .json()
            .await
            .map_err(|e| SkyfitError::Auth(format!("failed to parse token response: {e}")))?;

        let lifetime = Duration::from_secs(refreshed.expires_in.max(0).unsigned_abs());
        let expires_at = Instant::now() + lifetime.saturating_sub(self.refresh_margin);

        debug!(expires_in = refreshed.expires_in, "refreshed calendar access token");
        Ok(CachedToken { access_token: refreshed.access_token, expires_at })
    }
}

#[async_trait]
impl TokenProvider for RefreshingTokenProvider {
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.access_token.clone());
            }
        }

        let fresh = self.refresh().await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }
}

#[derive(Debug, Deserialize)]
struct TokenRefreshResponse {
    access_token: String,
    expires_in: i64,
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn oauth_config(endpoint: String) -> OAuthConfig {
        OAuthConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            refresh_token: "refresh-token".to_string(),
            token_endpoint: endpoint,
        }
    }

    #[tokio::test]
    async fn refreshes_once_and_reuses_cached_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh-token",
                "expires_in": 3600,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = RefreshingTokenProvider::new(oauth_config(format!("{}/token", server.uri())))
            .with_refresh_margin(Duration::from_secs(0));

        assert_eq!(provider.access_token().await.unwrap(), "fresh-token");
        assert_eq!(provider.access_token().await.unwrap(), "fresh-token");
    }

    #[tokio::test]
    async fn expired_token_triggers_a_new_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "short-lived",
                "expires_in": 0,
            })))
            .expect(2)
            .mount(&server)
            .await;

        let provider = RefreshingTokenProvider::new(oauth_config(format!("{}/token", server.uri())))
            .with_refresh_margin(Duration::from_secs(0));

        provider.access_token().await.unwrap();
        provider.access_token().await.unwrap();
    }

    #[tokio::test]
    async fn rejection_surfaces_as_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let provider =
            RefreshingTokenProvider::new(oauth_config(format!("{}/token", server.uri())));

        let err = provider.access_token().await.unwrap_err();
        assert!(matches!(err, SkyfitError::Auth(_)));
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[tokio::test]
    async fn static_provider_returns_fixed_token() {
        let provider = StaticTokenProvider::new("fixed");
        assert_eq!(provider.access_token().await.unwrap(), "fixed");
    }
}
