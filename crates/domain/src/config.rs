//! Configuration structures
//!
//! Deserialized once per run by the infra loader and immutable thereafter.
//! String values may carry `${VAR}` references that the loader resolves
//! from the process environment before deserialization.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CHECKPOINT_FLUSH_INTERVAL, OUTPUT_COLUMNS};
use crate::types::Category;

/// Root configuration for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub jira: JiraConfig,
    pub classification: ClassificationConfig,
    pub output: OutputConfig,
}

/// Jira connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraConfig {
    /// Issue search endpoint, e.g. `https://api.atlassian.com/ex/jira/<cloud>/rest/api/3/search`.
    pub api_url: String,

    /// OAuth token endpoint used for refresh exchanges.
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Saved-filter identifier the search runs by reference.
    pub filter_id: String,
}

/// Classification backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// Which provider backend to instantiate.
    #[serde(rename = "llm_provider")]
    pub provider: ProviderKind,

    /// API key for the selected provider.
    #[serde(rename = "llm_api_key")]
    pub api_key: String,

    /// Model override; each provider has its own default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// AWS region for the Bedrock backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Business categories offered to the model.
    pub categories: Vec<Category>,

    /// Checkpoint flush cadence while classifying.
    #[serde(default = "default_flush_interval")]
    pub flush_interval: usize,
}

/// Supported classification backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "claude")]
    Claude,
    #[serde(rename = "bedrock")]
    Bedrock,
}

/// Output locations and checkpoint column set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory raw extraction snapshots are written to.
    pub raw_data_path: String,

    /// Path of the classification checkpoint file.
    pub checkpoint_path: String,

    /// Checkpoint header columns; defaults to the fixed schema.
    #[serde(default = "default_columns")]
    pub columns: Vec<String>,
}

fn default_token_url() -> String {
    "https://auth.atlassian.com/oauth/token".to_string()
}

fn default_flush_interval() -> usize {
    DEFAULT_CHECKPOINT_FLUSH_INTERVAL
}

fn default_columns() -> Vec<String> {
    OUTPUT_COLUMNS.iter().map(|c| (*c).to_string()).collect()
}

#[cfg(test)]
mod tests {
    //! Unit tests for config.
    use super::*;

    #[test]
    fn parses_minimal_toml_config() {
        let toml_content = r#"
[jira]
api_url = "https://api.atlassian.com/ex/jira/abc/rest/api/3/search"
filter_id = "10042"

[classification]
llm_provider = "openai"
llm_api_key = "sk-test"

[[classification.categories]]
name = "Bug"
description = "Defects in shipped behavior"

[output]
raw_data_path = "output/raw"
checkpoint_path = "output/processed_issues.csv"
"#;

        let config: PipelineConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.jira.token_url, "https://auth.atlassian.com/oauth/token");
        assert_eq!(config.classification.provider, ProviderKind::OpenAi);
        assert_eq!(config.classification.flush_interval, 25);
        assert_eq!(config.output.columns.len(), 13);
        assert_eq!(config.output.columns[0], "Project");
        assert_eq!(config.output.columns[12], "Category");
    }

    #[test]
    fn parses_provider_names() {
        for (name, expected) in [
            ("openai", ProviderKind::OpenAi),
            ("claude", ProviderKind::Claude),
            ("bedrock", ProviderKind::Bedrock),
        ] {
            let parsed: ProviderKind =
                serde_json::from_str(&format!("\"{name}\"")).unwrap();
            assert_eq!(parsed, expected);
        }
    }
}
