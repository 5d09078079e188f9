//! OAuth 2.0 token lifecycle
//!
//! One owned [`TokenStore`] holds the live token triple, refreshes it
//! proactively ahead of expiry, and persists refreshed tokens through an
//! injected [`TokenPersistence`] port. Nothing else in the pipeline mutates
//! token state.

pub mod env_file;
pub mod store;
pub mod traits;
pub mod types;

pub use env_file::EnvFilePersistence;
pub use store::TokenStore;
pub use traits::{NoopTokenPersistence, TokenPersistence};
pub use types::{ClientCredentials, TokenResponse, TokenSet};

/// Environment variable names holding the live token triple.
pub const ENV_ACCESS_TOKEN: &str = "JIRA_ACCESS_TOKEN";
pub const ENV_REFRESH_TOKEN: &str = "JIRA_REFRESH_TOKEN";
pub const ENV_TOKEN_EXPIRES_AT: &str = "JIRA_TOKEN_EXPIRES_AT";

/// Environment variable names holding the OAuth client credentials.
pub const ENV_CLIENT_ID: &str = "JIRA_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "JIRA_CLIENT_SECRET";
