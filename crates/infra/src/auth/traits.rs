//! Persistence port for the token store

use async_trait::async_trait;
use issuearc_domain::Result;

use super::types::TokenSet;

/// Trait for persisting a refreshed token triple to durable state.
///
/// Persistence is best-effort from the caller's point of view: the token
/// store logs a failed persist and keeps the in-memory refresh result.
#[async_trait]
pub trait TokenPersistence: Send + Sync {
    /// Persist the token triple for future process invocations.
    async fn persist(&self, tokens: &TokenSet) -> Result<()>;
}

/// Persistence adapter that stores nothing. Used by tests and one-off runs
/// that should not touch durable state.
pub struct NoopTokenPersistence;

#[async_trait]
impl TokenPersistence for NoopTokenPersistence {
    async fn persist(&self, _tokens: &TokenSet) -> Result<()> {
        Ok(())
    }
}
