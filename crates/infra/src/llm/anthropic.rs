//! Anthropic messages classification backend

use async_trait::async_trait;
use issuearc_core::IssueClassifier;
use issuearc_domain::constants::UNCLASSIFIED_SENTINEL;
use issuearc_domain::types::Category;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::http::HttpClient;

use super::{render_categories, ClassifierError};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const MAX_COMPLETION_TOKENS: u32 = 50;

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<RequestMessage>,
}

#[derive(Debug, Serialize)]
struct RequestMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic-backed issue classifier.
///
/// Unlike the other backends this one passes the description through
/// verbatim, even when empty, and lists the categories after it.
pub struct AnthropicClassifier {
    http: HttpClient,
    api_key: String,
    model: String,
    api_url: String,
}

impl AnthropicClassifier {
    /// Create a new classifier.
    ///
    /// # Arguments
    /// * `api_key` - Anthropic API key
    /// * `http` - Shared HTTP client
    pub fn new(api_key: String, http: HttpClient) -> Self {
        Self {
            http,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            api_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    /// Override the default model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API URL (for testing).
    #[cfg(test)]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    fn build_prompt(summary: &str, description: &str, categories: &[Category]) -> String {
        format!(
            "Classify the following issue based on its summary and description: \n\
             Only reply with the category name.\n\n\
             Summary: {summary}\n\
             Description: {description}\n\
             Categories: {}",
            render_categories(categories),
        )
    }

    async fn request_label(
        &self,
        summary: &str,
        description: &str,
        categories: &[Category],
        model: Option<&str>,
    ) -> Result<String, ClassifierError> {
        let payload = MessagesRequest {
            model: model.unwrap_or(&self.model).to_string(),
            max_tokens: MAX_COMPLETION_TOKENS,
            messages: vec![RequestMessage {
                role: "user".to_string(),
                content: Self::build_prompt(summary, description, categories),
            }],
        };

        let builder = self
            .http
            .request(Method::POST, &self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&payload);

        let response = self
            .http
            .send(builder)
            .await
            .map_err(|err| ClassifierError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(match status.as_u16() {
                401 | 403 => ClassifierError::Authentication(message),
                code => ClassifierError::Api { status: code, message },
            });
        }

        let completion: MessagesResponse = response
            .json()
            .await
            .map_err(|err| ClassifierError::InvalidResponse(err.to_string()))?;

        let content = completion
            .content
            .iter()
            .find(|block| block.block_type == "text")
            .and_then(|block| block.text.as_deref())
            .map(|text| text.trim().to_string())
            .ok_or_else(|| {
                ClassifierError::InvalidResponse("no text content returned".to_string())
            })?;

        if content.is_empty() {
            return Err(ClassifierError::EmptyCompletion);
        }
        Ok(content)
    }
}

#[async_trait]
impl IssueClassifier for AnthropicClassifier {
    async fn classify(
        &self,
        summary: &str,
        description: &str,
        categories: &[Category],
        model: Option<&str>,
    ) -> String {
        match self.request_label(summary, description, categories, model).await {
            Ok(label) => label,
            Err(err) => {
                error!(error = %err, "Anthropic classification failed");
                UNCLASSIFIED_SENTINEL.to_string()
            }
        }
    }
}
