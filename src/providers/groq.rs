//! Groq backend (OpenAI-compatible chat completions).

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{GenerationRequest, Provider, ProviderError, ProviderKind, build_prompt, non_empty};
use crate::http_client::HttpClient;

pub const GROQ_API_BASE: &str = "https://api.groq.com";

/// Text models suitable for commit messages. Deprecated and speech models
/// are left out; see https://console.groq.com/docs/deprecations.
const GROQ_MODELS: &[&str] = &[
    "groq/compound",
    "groq/compound-mini",
    "llama-3.1-8b-instant",
    "llama-3.3-70b-versatile",
    "mixtral-8x7b-32768",
    "openai/gpt-oss-120b",
    "openai/gpt-oss-20b",
    "meta-llama/llama-4-maverick-17b-128e-instruct",
    "meta-llama/llama-4-scout-17b-16e-instruct",
    "moonshotai/kimi-k2-instruct-0905",
    "qwen/qwen3-32b",
];

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct GroqProvider {
    http: Arc<dyn HttpClient>,
    api_key: String,
    model: String,
    base_url: String,
}

impl GroqProvider {
    pub fn new(http: Arc<dyn HttpClient>, api_key: &str, model: &str) -> Self {
        Self {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: GROQ_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Provider for GroqProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Groq
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate_commit_message(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, ProviderError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": build_prompt(request)
                }
            ]
        });
        let authorization = format!("Bearer {}", self.api_key);

        info!("Requesting commit message from Groq ({})", self.model);
        let response = self
            .http
            .post_json(
                &format!("{}/openai/v1/chat/completions", self.base_url),
                &[
                    ("Authorization", authorization.as_str()),
                    ("content-type", "application/json"),
                ],
                &body,
            )
            .await
            .map_err(|e| ProviderError::Transport {
                provider: ProviderKind::Groq,
                source: e.into(),
            })?;

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&response).map_err(|e| ProviderError::MalformedResponse {
                provider: ProviderKind::Groq,
                message: e.to_string(),
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse(ProviderKind::Groq))?
            .message
            .content
            .unwrap_or_default();

        non_empty(ProviderKind::Groq, content)
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        Ok(GROQ_MODELS.iter().map(|m| m.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::testing::MockHttpClient;

    fn provider(http: Arc<MockHttpClient>) -> GroqProvider {
        GroqProvider::new(http, "gsk_test", "llama-3.3-70b-versatile").with_base_url("http://groq.test")
    }

    #[tokio::test]
    async fn test_list_models_is_static_and_includes_default() {
        let http = Arc::new(MockHttpClient::default());
        let models = provider(http.clone()).list_models().await.unwrap();

        assert_eq!(models.len(), 11);
        assert_eq!(models[0], "groq/compound");
        assert!(models.contains(&ProviderKind::Groq.default_model().to_string()));
        assert!(http.requests().is_empty());
    }

    #[tokio::test]
    async fn test_validate_model() {
        let http = Arc::new(MockHttpClient::default());
        let groq = provider(http);

        assert!(groq.validate_model("qwen/qwen3-32b").await.is_ok());
        let err = groq.validate_model("gpt-4").await.unwrap_err();
        assert!(matches!(err, ProviderError::ModelUnavailable { ref model, .. } if model == "gpt-4"));
    }

    #[tokio::test]
    async fn test_generate_sends_chat_completion() {
        let http = Arc::new(MockHttpClient::new(
            r#"{"choices": [{"message": {"role": "assistant", "content": "fix(git): quote paths\n"}}]}"#,
        ));
        let request = GenerationRequest::new("status", "diff", Some("keep it short".to_string()));

        let message = provider(http.clone())
            .generate_commit_message(&request)
            .await
            .unwrap();

        assert_eq!(message, "fix(git): quote paths");
        let sent = &http.requests()[0];
        assert_eq!(sent.url, "http://groq.test/openai/v1/chat/completions");
        assert!(sent
            .headers
            .contains(&("Authorization".to_string(), "Bearer gsk_test".to_string())));
        let body = sent.body.as_ref().unwrap();
        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert_eq!(body["messages"][0]["content"], build_prompt(&request));
    }

    #[tokio::test]
    async fn test_generate_without_choices_is_empty_response() {
        let http = Arc::new(MockHttpClient::new(r#"{"choices": []}"#));
        let err = provider(http)
            .generate_commit_message(&GenerationRequest::new("s", "d", None))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "no response from Groq API");
    }

    #[tokio::test]
    async fn test_generate_with_garbage_body_is_malformed() {
        let http = Arc::new(MockHttpClient::new("<html>bad gateway</html>"));
        let err = provider(http)
            .generate_commit_message(&GenerationRequest::new("s", "d", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse { .. }));
    }
}
