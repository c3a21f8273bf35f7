//! AI backends that turn a git status and diff into a commit message.
//!
//! Every backend implements [`Provider`], so the pipeline never needs to know
//! which one it is talking to. Tests substitute their own implementation of
//! the trait instead of patching backend internals.

pub mod gemini;
pub mod groq;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::errors::{BoxError, GocoError};
use crate::git::GitSnapshot;
use crate::http_client::HttpClient;

pub use gemini::GeminiProvider;
pub use groq::GroqProvider;

const CONVENTIONAL_COMMITS_CHEATSHEET: &str = "https://gist.githubusercontent.com/qoomon/5dfcdf8eec66a051ecd85625518cfd13/raw/d7d529a329079616d47dcf100bd7d2d2c848e835/conventional-commits-cheatsheet.md";

/// Supported backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Groq,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Groq => "groq",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "Gemini",
            ProviderKind::Groq => "Groq",
        }
    }

    /// Model used when `--model` is not given.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-2.5-flash",
            ProviderKind::Groq => "llama-3.3-70b-versatile",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ProviderKind {
    type Err = GocoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "groq" => Ok(ProviderKind::Groq),
            other => Err(GocoError::Validation {
                field: "provider".to_string(),
                message: format!("unsupported provider: {other}"),
                help: Some("supported providers: gemini, groq".to_string()),
                source: None,
            }),
        }
    }
}

/// Failures reported by a backend.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} API error: {source}")]
    Transport {
        provider: ProviderKind,
        #[source]
        source: BoxError,
    },

    #[error("no response from {0} API")]
    EmptyResponse(ProviderKind),

    #[error("{provider} returned an unexpected response: {message}")]
    MalformedResponse {
        provider: ProviderKind,
        message: String,
    },

    #[error("failed to list {provider} models: {source}")]
    ListModels {
        provider: ProviderKind,
        #[source]
        source: Box<ProviderError>,
    },

    #[error("model {model} not available\nAvailable Models:\n{}", .available.join("\n"))]
    ModelUnavailable {
        model: String,
        available: Vec<String>,
    },
}

/// Input of a generation call. Built once from a snapshot and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    status: String,
    diff: String,
    custom_instructions: Option<String>,
}

impl GenerationRequest {
    pub fn new(
        status: impl Into<String>,
        diff: impl Into<String>,
        custom_instructions: Option<String>,
    ) -> Self {
        Self {
            status: status.into(),
            diff: diff.into(),
            custom_instructions: custom_instructions.filter(|c| !c.trim().is_empty()),
        }
    }

    pub fn from_snapshot(snapshot: &GitSnapshot, custom_instructions: Option<String>) -> Self {
        Self::new(&snapshot.status, &snapshot.diff, custom_instructions)
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn diff(&self) -> &str {
        &self.diff
    }

    pub fn custom_instructions(&self) -> Option<&str> {
        self.custom_instructions.as_deref()
    }
}

/// Fixed prompt shared by every backend.
pub fn build_prompt(request: &GenerationRequest) -> String {
    let mut prompt = format!(
        "Generate a Conventional Commit based strictly on the following:\n\n\
         Git Status:\n{}\n\n\
         Git Diff:\n{}\n\n\
         Before responding, you MUST:\n\
         - Read: {}\n\
         - ONLY output the commit message and description.\n\
         - DO NOT include markdown, code blocks, quotes, or any formatting.\n\
         - Output MUST be plain text only.\n\
         - Do not add extra explanations, notes, or commentary.\n\
         - The first line is the commit summary, the rest is the description.\n\
         - Follow Conventional Commit standards exactly.\n\
         - No extra lines before or after the commit message.\n",
        request.status(),
        request.diff(),
        CONVENTIONAL_COMMITS_CHEATSHEET,
    );

    if let Some(instructions) = request.custom_instructions() {
        prompt.push_str(&format!("\n\nAdditional Instructions:\n{instructions}\n"));
    }

    prompt
}

/// Capability shared by all backends.
#[async_trait]
pub trait Provider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Model this instance generates with.
    fn model(&self) -> &str;

    async fn generate_commit_message(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, ProviderError>;

    async fn list_models(&self) -> Result<Vec<String>, ProviderError>;

    /// Checks `model` against [`Provider::list_models`].
    ///
    /// Not every backend has an existence check of its own, so membership in
    /// the listing is the test.
    async fn validate_model(&self, model: &str) -> Result<(), ProviderError> {
        let available = self.list_models().await?;
        if available.iter().any(|m| m == model) {
            Ok(())
        } else {
            Err(ProviderError::ModelUnavailable {
                model: model.to_string(),
                available,
            })
        }
    }
}

/// Creates the backend for `kind`.
pub fn build_provider(
    kind: ProviderKind,
    api_key: &str,
    model: &str,
    http: Arc<dyn HttpClient>,
) -> Result<Box<dyn Provider>, GocoError> {
    if api_key.trim().is_empty() {
        return Err(GocoError::Provider {
            provider: kind.as_str().to_string(),
            message: format!("failed to create {} client: API key is empty", kind.as_str()),
            source: None,
        });
    }

    Ok(match kind {
        ProviderKind::Gemini => Box::new(GeminiProvider::new(http, api_key, model)),
        ProviderKind::Groq => Box::new(GroqProvider::new(http, api_key, model)),
    })
}

/// Trims the backend's answer and rejects blank output.
fn non_empty(provider: ProviderKind, text: String) -> Result<String, ProviderError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(ProviderError::EmptyResponse(provider))
    } else {
        Ok(trimmed.to_string())
    }
}
