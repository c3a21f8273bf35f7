//! Resolves the effective model and checks the provider actually offers it.

use crate::errors::GocoError;
use crate::providers::{Provider, ProviderKind};
use tracing::{debug, info};

/// Explicit `--model` value, else the provider's default.
pub fn resolve_model(explicit: Option<&str>, kind: ProviderKind) -> String {
    match explicit.map(str::trim).filter(|m| !m.is_empty()) {
        Some(model) => model.to_string(),
        None => {
            debug!("No model given, using {} default", kind.as_str());
            kind.default_model().to_string()
        }
    }
}

/// Command that prints the models of `kind`.
pub fn models_command_hint(kind: ProviderKind) -> String {
    format!("run `goco models --provider {}` to see the available models", kind.as_str())
}

/// Confirms `model` is in the provider's listing.
///
/// Any failure, including a failed listing, becomes a `Validation` error
/// pointing at the model-listing command. Nothing is retried.
pub async fn validate_model(provider: &dyn Provider, model: &str) -> Result<(), GocoError> {
    info!("Validating model {} for {}", model, provider.kind());
    provider
        .validate_model(model)
        .await
        .map_err(|e| GocoError::Validation {
            field: "model".to_string(),
            message: e.to_string(),
            help: Some(models_command_hint(provider.kind())),
            source: Some(Box::new(e)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{GenerationRequest, ProviderError};
    use async_trait::async_trait;

    use std::error::Error as _;

    struct Catalogue(Vec<&'static str>);

    /// Backend whose model listing fails at the transport level.
    struct Unreachable;

    #[async_trait]
    impl Provider for Unreachable {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Gemini
        }

        fn model(&self) -> &str {
            "gemini-2.5-flash"
        }

        async fn generate_commit_message(
            &self,
            _request: &GenerationRequest,
        ) -> Result<String, ProviderError> {
            Ok(String::new())
        }

        async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
            Err(ProviderError::ListModels {
                provider: ProviderKind::Gemini,
                source: Box::new(ProviderError::Transport {
                    provider: ProviderKind::Gemini,
                    source: "HTTP 403: API key not valid".into(),
                }),
            })
        }
    }

    #[async_trait]
    impl Provider for Catalogue {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Gemini
        }

        fn model(&self) -> &str {
            "gemini-2.5-flash"
        }

        async fn generate_commit_message(
            &self,
            _request: &GenerationRequest,
        ) -> Result<String, ProviderError> {
            Ok(String::new())
        }

        async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
            Ok(self.0.iter().map(|m| m.to_string()).collect())
        }
    }

    #[test]
    fn test_resolve_model_prefers_explicit_value() {
        assert_eq!(resolve_model(Some("gemini-2.5-pro"), ProviderKind::Gemini), "gemini-2.5-pro");
    }

    #[test]
    fn test_resolve_model_falls_back_to_provider_default() {
        assert_eq!(resolve_model(None, ProviderKind::Gemini), "gemini-2.5-flash");
        assert_eq!(resolve_model(Some("  "), ProviderKind::Groq), "llama-3.3-70b-versatile");
    }

    #[tokio::test]
    async fn test_known_model_passes() {
        let provider = Catalogue(vec!["gemini-2.5-flash", "gemini-2.5-pro"]);
        assert!(validate_model(&provider, "gemini-2.5-pro").await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_model_points_at_listing_command() {
        let provider = Catalogue(vec!["gemini-2.5-flash"]);
        let err = validate_model(&provider, "gemini-0").await.unwrap_err();

        match &err {
            GocoError::Validation { field, help, .. } => {
                assert_eq!(field, "model");
                assert!(help.as_deref().unwrap().contains("goco models --provider gemini"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("gemini-2.5-flash"));
    }

    #[tokio::test]
    async fn test_listing_failure_keeps_provider_error_as_source() {
        let err = validate_model(&Unreachable, "gemini-2.5-flash").await.unwrap_err();

        assert!(matches!(err, GocoError::Validation { .. }));
        let cause = err
            .source()
            .and_then(|s| s.downcast_ref::<ProviderError>())
            .expect("provider error kept as source");
        assert!(matches!(cause, ProviderError::ListModels { .. }));
        assert!(cause.source().unwrap().to_string().contains("HTTP 403"));
    }
}
