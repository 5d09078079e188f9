//! LLM classification backends
//!
//! One client per backend, all implementing the core `IssueClassifier`
//! port. Classification is best-effort per issue: a provider failure is
//! logged and degraded to the `"Unclassified"` sentinel instead of
//! aborting the run.

pub mod anthropic;
pub mod bedrock;
pub mod openai;

pub use anthropic::AnthropicClassifier;
pub use bedrock::BedrockClassifier;
pub use openai::OpenAiClassifier;

use issuearc_domain::types::Category;

/// Provider-side failure while requesting a label.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// Network-level error (connection failed, timeout, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// Provider returned an error response
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Authentication failed (invalid API key)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Response body doesn't match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider answered with an empty completion
    #[error("Empty completion")]
    EmptyCompletion,
}

/// Render the category list for prompt embedding, one `Name: Description`
/// entry per category.
pub(crate) fn render_categories(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|category| format!("{}: {}", category.name, category.description))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    //! Unit tests for llm.
    use super::*;

    #[test]
    fn renders_categories_as_name_description_pairs() {
        let categories = vec![
            Category { name: "Bug".to_string(), description: "defects".to_string() },
            Category { name: "Feature".to_string(), description: "new behavior".to_string() },
        ];

        assert_eq!(render_categories(&categories), "Bug: defects; Feature: new behavior");
    }
}
