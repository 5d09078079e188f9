//! Amazon Bedrock classification backend
//!
//! Invokes the bedrock-runtime HTTP API with a Bedrock API key (bearer
//! auth), so it shares the same HTTP stack as the other backends.

use async_trait::async_trait;
use issuearc_core::IssueClassifier;
use issuearc_domain::constants::UNCLASSIFIED_SENTINEL;
use issuearc_domain::types::Category;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::http::HttpClient;

use super::{render_categories, ClassifierError};

const DEFAULT_MODEL: &str = "anthropic.claude-instant-v1";
const DEFAULT_REGION: &str = "us-east-1";
const MAX_COMPLETION_TOKENS: u32 = 50;
const TEMPERATURE: f32 = 0.0;

#[derive(Debug, Serialize)]
struct InvokeRequest {
    prompt: String,
    max_tokens_to_sample: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct InvokeResponse {
    #[serde(default)]
    completion: String,
}

/// Bedrock-backed issue classifier.
pub struct BedrockClassifier {
    http: HttpClient,
    api_key: String,
    model: String,
    base_url: String,
}

impl BedrockClassifier {
    /// Create a new classifier for the default region.
    ///
    /// # Arguments
    /// * `api_key` - Bedrock API key
    /// * `http` - Shared HTTP client
    pub fn new(api_key: String, http: HttpClient) -> Self {
        Self {
            http,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: region_base_url(DEFAULT_REGION),
        }
    }

    /// Target a different AWS region.
    #[must_use]
    pub fn with_region(mut self, region: &str) -> Self {
        self.base_url = region_base_url(region);
        self
    }

    /// Override the default model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the base URL (for testing).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn build_prompt(summary: &str, description: &str, categories: &[Category]) -> String {
        let description = if description.is_empty() { "No description" } else { description };
        format!(
            "Classify the following Jira issue into one of these categories: {}.\n\
             Only reply with the category name.\n\n\
             Summary: {summary}\n\
             Description: {description}",
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
        let model = model.unwrap_or(&self.model);
        let url = format!("{}/model/{model}/invoke", self.base_url);

        let payload = InvokeRequest {
            prompt: Self::build_prompt(summary, description, categories),
            max_tokens_to_sample: MAX_COMPLETION_TOKENS,
            temperature: TEMPERATURE,
        };

        let builder = self
            .http
            .request(Method::POST, &url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
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

        let invoke: InvokeResponse = response
            .json()
            .await
            .map_err(|err| ClassifierError::InvalidResponse(err.to_string()))?;

        let completion = invoke.completion.trim().to_string();
        if completion.is_empty() {
            return Err(ClassifierError::EmptyCompletion);
        }
        Ok(completion)
    }
}

fn region_base_url(region: &str) -> String {
    format!("https://bedrock-runtime.{region}.amazonaws.com")
}

#[async_trait]
impl IssueClassifier for BedrockClassifier {
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
                error!(error = %err, "Bedrock classification failed");
                UNCLASSIFIED_SENTINEL.to_string()
            }
        }
    }
}
