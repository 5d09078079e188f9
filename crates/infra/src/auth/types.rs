//! OAuth 2.0 types and structures

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use issuearc_domain::constants::DEFAULT_TOKEN_EXPIRES_IN_SECS;

use super::{ENV_ACCESS_TOKEN, ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_REFRESH_TOKEN,
    ENV_TOKEN_EXPIRES_AT};

/// OAuth 2.0 access and refresh tokens with expiry metadata.
///
/// `expires_at` is the wall-clock instant after which the access token must
/// not be used. Mutated only by the token store's refresh path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// Bearer access token for API authentication
    pub access_token: String,

    /// Refresh token for obtaining new access tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Absolute expiration timestamp (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenSet {
    /// Create a new `TokenSet`, calculating `expires_at` from a lifetime in
    /// seconds.
    #[must_use]
    pub fn new(access_token: String, refresh_token: Option<String>, expires_in: i64) -> Self {
        let expires_at = if expires_in > 0 {
            Some(Utc::now() + chrono::Duration::seconds(expires_in))
        } else {
            None
        };

        Self { access_token, refresh_token, expires_at }
    }

    /// Create a `TokenSet` from an explicit expiry instant.
    #[must_use]
    pub fn from_parts(
        access_token: String,
        refresh_token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self { access_token, refresh_token, expires_at }
    }

    /// Check if the access token is expired or will expire within the given
    /// grace period.
    ///
    /// Returns `false` when no expiry is set.
    #[must_use]
    pub fn is_expired(&self, grace_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + chrono::Duration::seconds(grace_seconds) >= expires_at,
            None => false,
        }
    }

    /// Get seconds until token expiration, or `None` when no expiry is set.
    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.expires_at.map(|expires_at| (expires_at - Utc::now()).num_seconds())
    }

    /// Read the live token triple from the process environment.
    ///
    /// Returns `None` when no access token is configured. A malformed or
    /// missing expiry timestamp reads as "already expired" so the first use
    /// forces a refresh.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let access_token = non_empty_env(ENV_ACCESS_TOKEN)?;
        let refresh_token = non_empty_env(ENV_REFRESH_TOKEN);
        let expiry_secs = std::env::var(ENV_TOKEN_EXPIRES_AT)
            .ok()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(0);

        Some(Self {
            access_token,
            refresh_token,
            expires_at: Utc.timestamp_opt(expiry_secs, 0).single(),
        })
    }
}

/// OAuth token response from the authorization server (RFC 6749).
///
/// `expires_in` defaults to one hour when the server omits it.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    DEFAULT_TOKEN_EXPIRES_IN_SECS
}

impl From<TokenResponse> for TokenSet {
    fn from(response: TokenResponse) -> Self {
        Self::new(response.access_token, response.refresh_token, response.expires_in)
    }
}

/// OAuth client credentials used for token exchanges.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    /// Read client credentials from the process environment.
    ///
    /// Returns `None` when either value is missing or empty.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Some(Self {
            client_id: non_empty_env(ENV_CLIENT_ID)?,
            client_secret: non_empty_env(ENV_CLIENT_SECRET)?,
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
