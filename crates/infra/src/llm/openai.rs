//! OpenAI chat-completions classification backend

use async_trait::async_trait;
use issuearc_core::IssueClassifier;
use issuearc_domain::constants::UNCLASSIFIED_SENTINEL;
use issuearc_domain::types::Category;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::http::HttpClient;

use super::{render_categories, ClassifierError};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const MAX_COMPLETION_TOKENS: u32 = 30;
const TEMPERATURE: f32 = 0.0;

const SYSTEM_PROMPT: &str = "You are an expert JIRA analyst. Your job is to classify JIRA \
    issues into exactly one of the provided business categories. Respond with only the \
    category name. Do not explain or elaborate.";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

/// OpenAI-backed issue classifier.
pub struct OpenAiClassifier {
    http: HttpClient,
    api_key: String,
    model: String,
    api_url: String,
}

impl OpenAiClassifier {
    /// Create a new classifier.
    ///
    /// # Arguments
    /// * `api_key` - OpenAI API key
    /// * `http` - Shared HTTP client
    pub fn new(api_key: String, http: HttpClient) -> Self {
        Self {
            http,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            api_url: OPENAI_API_URL.to_string(),
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
        let payload = ChatCompletionRequest {
            model: model.unwrap_or(&self.model).to_string(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: SYSTEM_PROMPT.to_string() },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::build_prompt(summary, description, categories),
                },
            ],
            max_tokens: MAX_COMPLETION_TOKENS,
            temperature: TEMPERATURE,
        };

        let builder = self
            .http
            .request(Method::POST, &self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
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

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| ClassifierError::InvalidResponse(err.to_string()))?;

        let content = completion
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| ClassifierError::InvalidResponse("no choices returned".to_string()))?;

        if content.is_empty() {
            return Err(ClassifierError::EmptyCompletion);
        }
        Ok(content)
    }
}

#[async_trait]
impl IssueClassifier for OpenAiClassifier {
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
                error!(error = %err, "OpenAI classification failed");
                UNCLASSIFIED_SENTINEL.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for llm::openai.
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn classifier(api_url: String) -> OpenAiClassifier {
        let http = HttpClient::builder().max_attempts(1).build().expect("http client");
        OpenAiClassifier::new("test-api-key".to_string(), http).with_api_url(api_url)
    }

    fn categories() -> Vec<Category> {
        vec![Category { name: "Bug".to_string(), description: "defects".to_string() }]
    }

    fn completion_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
    }

    #[tokio::test]
    async fn returns_the_trimmed_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("  Bug \n")))
            .mount(&server)
            .await;

        let label = classifier(format!("{}/v1/chat/completions", server.uri()))
            .classify("summary", "description", &categories(), None)
            .await;

        assert_eq!(label, "Bug");
    }

    #[tokio::test]
    async fn empty_description_uses_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("Description: No description"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Bug")))
            .expect(1)
            .mount(&server)
            .await;

        let label = classifier(format!("{}/v1/chat/completions", server.uri()))
            .classify("summary", "", &categories(), None)
            .await;

        assert_eq!(label, "Bug");
    }

    #[tokio::test]
    async fn auth_failure_degrades_to_sentinel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let label = classifier(server.uri())
            .classify("summary", "description", &categories(), None)
            .await;

        assert_eq!(label, "Unclassified");
    }

    #[tokio::test]
    async fn malformed_response_degrades_to_sentinel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let label = classifier(server.uri())
            .classify("summary", "description", &categories(), None)
            .await;

        assert_eq!(label, "Unclassified");
    }

    #[tokio::test]
    async fn empty_completion_degrades_to_sentinel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("   ")))
            .mount(&server)
            .await;

        let label = classifier(server.uri())
            .classify("summary", "description", &categories(), None)
            .await;

        assert_eq!(label, "Unclassified");
    }

    #[tokio::test]
    async fn model_override_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("\"model\":\"gpt-4.1\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Bug")))
            .expect(1)
            .mount(&server)
            .await;

        let label = classifier(server.uri())
            .classify("summary", "description", &categories(), Some("gpt-4.1"))
            .await;

        assert_eq!(label, "Bug");
    }
}
