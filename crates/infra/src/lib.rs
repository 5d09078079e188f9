//! # IssueArc Infra
//!
//! Infrastructure layer - adapters for everything the core reaches through
//! ports.
//!
//! This crate contains:
//! - Retrying HTTP client shared by every remote integration
//! - OAuth token store with an injected persistence port
//! - Jira paginated extractor, raw-snapshot store, CSV checkpoint store
//! - LLM classifier clients (OpenAI, Anthropic, Bedrock)
//! - Configuration loader with environment interpolation

pub mod auth;
pub mod capture;
pub mod checkpoint;
pub mod config;
pub mod errors;
pub mod http;
pub mod jira;
pub mod llm;

// Re-export the adapters callers wire together
pub use auth::{EnvFilePersistence, NoopTokenPersistence, TokenPersistence, TokenSet, TokenStore};
pub use capture::FileSnapshotStore;
pub use checkpoint::CsvCheckpointStore;
pub use http::HttpClient;
pub use jira::JiraClient;
pub use llm::{AnthropicClassifier, BedrockClassifier, OpenAiClassifier};
