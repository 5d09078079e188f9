//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for IssueArc
///
/// Fatal variants (`Auth`, `Extraction`, `Schema`, `Selection`, `Config`)
/// abort the run; per-issue classification failures never surface here —
/// they degrade to the `"Unclassified"` sentinel at the provider boundary.
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum IssueArcError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Schema error: missing fields {missing:?}")]
    Schema { missing: Vec<String> },

    #[error("Selection error: {0}")]
    Selection(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for IssueArc operations
pub type Result<T> = std::result::Result<T, IssueArcError>;
