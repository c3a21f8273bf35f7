//! Google Gemini backend (Generative Language REST API).

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use super::{GenerationRequest, Provider, ProviderError, ProviderKind, build_prompt, non_empty};
use crate::http_client::HttpClient;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

const MODEL_PREFIX: &str = "gemini-";

#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
    #[serde(rename = "nextPageToken", default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

pub struct GeminiProvider {
    http: Arc<dyn HttpClient>,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(http: Arc<dyn HttpClient>, api_key: &str, model: &str) -> Self {
        Self {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    /// Points the provider at another endpoint (proxies, tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn transport(err: anyhow::Error) -> ProviderError {
        ProviderError::Transport {
            provider: ProviderKind::Gemini,
            source: err.into(),
        }
    }

    fn malformed(err: serde_json::Error) -> ProviderError {
        ProviderError::MalformedResponse {
            provider: ProviderKind::Gemini,
            message: err.to_string(),
        }
    }

    /// Listing URL for one page, with the query string properly encoded.
    fn models_url(&self, page_token: Option<&str>) -> Result<Url, ProviderError> {
        let mut params = vec![("pageSize", "1000")];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }
        Url::parse_with_params(&format!("{}/v1beta/models", self.base_url), &params).map_err(|e| {
            ProviderError::Transport {
                provider: ProviderKind::Gemini,
                source: Box::new(e),
            }
        })
    }

    /// Every model name the API reports, `models/` prefix removed.
    async fn fetch_model_names(&self) -> Result<Vec<String>, ProviderError> {
        let headers = [("x-goog-api-key", self.api_key.as_str())];
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let url = self.models_url(page_token.as_deref())?;

            let body = self.http.get(url.as_str(), &headers).await.map_err(Self::transport)?;
            let page: ListModelsResponse = serde_json::from_str(&body).map_err(Self::malformed)?;

            names.extend(
                page.models
                    .into_iter()
                    .map(|m| m.name.trim_start_matches("models/").to_string()),
            );

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("Gemini reported {} model(s)", names.len());
        Ok(names)
    }
}

/// Keeps the `gemini-` models, or everything if none match.
pub fn filter_gemini_models(names: Vec<String>) -> Vec<String> {
    let filtered: Vec<String> = names
        .iter()
        .filter(|name| name.starts_with(MODEL_PREFIX))
        .cloned()
        .collect();

    if filtered.is_empty() {
        if !names.is_empty() {
            warn!("No {}* models in listing, returning all {}", MODEL_PREFIX, names.len());
        }
        names
    } else {
        filtered
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate_commit_message(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, ProviderError> {
        let prompt = build_prompt(request);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }
            ]
        });

        info!("Requesting commit message from Gemini ({})", self.model);
        let response = self
            .http
            .post_json(
                &url,
                &[
                    ("x-goog-api-key", self.api_key.as_str()),
                    ("content-type", "application/json"),
                ],
                &body,
            )
            .await
            .map_err(Self::transport)?;

        let parsed: GenerateContentResponse =
            serde_json::from_str(&response).map_err(Self::malformed)?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        non_empty(ProviderKind::Gemini, text)
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let names = self
            .fetch_model_names()
            .await
            .map_err(|e| ProviderError::ListModels {
                provider: ProviderKind::Gemini,
                source: Box::new(e),
            })?;
        Ok(filter_gemini_models(names))
    }
}
