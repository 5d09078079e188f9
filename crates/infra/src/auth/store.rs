//! Token store with proactive refresh
//!
//! Owns the live token triple for the run:
//! - Hands out a valid access token, refreshing ahead of expiry
//! - Exchanges the refresh token (or a one-time authorization code) at the
//!   token endpoint
//! - Persists refreshed tokens through the injected persistence port

use std::sync::Arc;

use issuearc_domain::constants::TOKEN_REFRESH_GRACE_SECS;
use issuearc_domain::{IssueArcError, Result};
use reqwest::Method;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::http::HttpClient;

use super::traits::TokenPersistence;
use super::types::{ClientCredentials, TokenResponse, TokenSet};

#[derive(Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct AuthorizationCodeRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
}

/// Owns the bearer token, its expiry instant, and the refresh credential.
///
/// A refresh failure leaves the prior token untouched; a persistence
/// failure after a successful refresh is logged and never surfaced.
pub struct TokenStore {
    http: HttpClient,
    token_url: String,
    credentials: Option<ClientCredentials>,
    persistence: Arc<dyn TokenPersistence>,
    current: RwLock<Option<TokenSet>>,
    grace_seconds: i64,
}

impl TokenStore {
    /// Create a new token store.
    ///
    /// # Arguments
    /// * `http` - Shared HTTP client
    /// * `token_url` - OAuth token endpoint
    /// * `credentials` - OAuth client credentials, if configured
    /// * `initial` - Token triple loaded at startup, if any
    /// * `persistence` - Where refreshed tokens are written
    #[must_use]
    pub fn new(
        http: HttpClient,
        token_url: String,
        credentials: Option<ClientCredentials>,
        initial: Option<TokenSet>,
        persistence: Arc<dyn TokenPersistence>,
    ) -> Self {
        Self {
            http,
            token_url,
            credentials,
            persistence,
            current: RwLock::new(initial),
            grace_seconds: TOKEN_REFRESH_GRACE_SECS,
        }
    }

    /// Create a token store from the process environment.
    ///
    /// Missing credentials are not an error here: a run that only replays
    /// stored snapshots never exchanges a token. The first token use fails
    /// with `Auth("missing credentials")` instead.
    #[must_use]
    pub fn from_env(
        http: HttpClient,
        token_url: String,
        persistence: Arc<dyn TokenPersistence>,
    ) -> Self {
        Self::new(
            http,
            token_url,
            ClientCredentials::from_env(),
            TokenSet::from_env(),
            persistence,
        )
    }

    /// Get a valid access token, refreshing first when the cached one is
    /// within the grace period of its expiry.
    ///
    /// # Errors
    /// Returns `Auth` when no token is held or the refresh exchange fails.
    pub async fn get_valid_token(&self) -> Result<String> {
        if self.should_refresh().await {
            info!("access token expired or about to expire, refreshing");
            self.refresh().await?;
        }

        let tokens = self.current.read().await;
        tokens
            .as_ref()
            .map(|t| t.access_token.clone())
            .ok_or_else(|| IssueArcError::Auth("missing credentials".to_string()))
    }

    async fn should_refresh(&self) -> bool {
        let tokens = self.current.read().await;
        match tokens.as_ref() {
            Some(t) => t.is_expired(self.grace_seconds),
            None => false,
        }
    }

    /// Exchange the refresh token for a new token pair.
    ///
    /// On success the cached token set is replaced atomically and the new
    /// triple is persisted best-effort. On any transport or non-2xx
    /// response the prior token remains in place.
    ///
    /// # Errors
    /// Returns `Auth` when no refresh token is held or the exchange fails.
    pub async fn refresh(&self) -> Result<TokenSet> {
        let credentials = self.configured_credentials()?;
        let previous_refresh = {
            let tokens = self.current.read().await;
            tokens
                .as_ref()
                .and_then(|t| t.refresh_token.clone())
                .ok_or_else(|| IssueArcError::Auth("missing credentials".to_string()))?
        };

        let payload = RefreshRequest {
            grant_type: "refresh_token",
            client_id: &credentials.client_id,
            client_secret: &credentials.client_secret,
            refresh_token: &previous_refresh,
        };

        let response = self.exchange(&payload).await?;

        // Some authorization servers omit the rotated refresh token; keep
        // the previous one so later refreshes still work.
        let refresh_token = response.refresh_token.or(Some(previous_refresh));
        let tokens =
            TokenSet::new(response.access_token, refresh_token, response.expires_in);

        self.install(tokens.clone()).await;
        info!("access token refreshed successfully");
        Ok(tokens)
    }

    /// Exchange a one-time authorization code for the initial token pair.
    ///
    /// Same success and persistence semantics as [`TokenStore::refresh`].
    ///
    /// # Errors
    /// Returns `Auth` when the exchange fails.
    pub async fn exchange_authorization_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenSet> {
        let credentials = self.configured_credentials()?;
        let payload = AuthorizationCodeRequest {
            grant_type: "authorization_code",
            client_id: &credentials.client_id,
            client_secret: &credentials.client_secret,
            code,
            redirect_uri,
        };

        let response = self.exchange(&payload).await?;
        let tokens = TokenSet::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
        );

        self.install(tokens.clone()).await;
        info!("authorization code exchanged for tokens");
        Ok(tokens)
    }

    fn configured_credentials(&self) -> Result<&ClientCredentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| IssueArcError::Auth("missing credentials".to_string()))
    }

    async fn exchange<P: Serialize + Sync>(&self, payload: &P) -> Result<TokenResponse> {
        let builder = self
            .http
            .request(Method::POST, &self.token_url)
            .header("Content-Type", "application/json")
            .json(payload);

        let response = self
            .http
            .send(builder)
            .await
            .map_err(|err| IssueArcError::Auth(format!("token request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(IssueArcError::Auth(format!(
                "token exchange failed ({status}): {body}"
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|err| IssueArcError::Auth(format!("failed to parse token response: {err}")))
    }

    /// Replace the cached token set and persist it best-effort.
    async fn install(&self, tokens: TokenSet) {
        *self.current.write().await = Some(tokens.clone());

        if let Err(err) = self.persistence.persist(&tokens).await {
            warn!(error = %err, "failed to persist refreshed tokens, continuing with in-memory token");
        }
    }

    /// Current token set, without triggering a refresh.
    pub async fn tokens(&self) -> Option<TokenSet> {
        self.current.read().await.clone()
    }
}
