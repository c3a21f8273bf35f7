//! API key resolution for the selected provider.
//!
//! The key comes from `--api-key`, then from the environment variable named in
//! the config, and only then from an interactive hidden prompt.

use std::io::Write;

use dialoguer::Password;
use tracing::{debug, info};

use crate::config::Config;
use crate::errors::GocoError;
use crate::providers::ProviderKind;

// =============================================================================
// Traits for Dependency Injection
// =============================================================================

/// Source of secrets typed by the user.
pub trait SecretPrompt {
    /// Asks for a secret without echoing it. Never returns a blank value.
    fn prompt_secret(&self, prompt: &str) -> Result<String, GocoError>;
}

/// Hidden terminal prompt.
pub struct TerminalPrompt;

impl SecretPrompt for TerminalPrompt {
    fn prompt_secret(&self, prompt: &str) -> Result<String, GocoError> {
        loop {
            let secret = Password::new()
                .with_prompt(prompt)
                .interact()
                .map_err(|e| GocoError::Validation {
                    field: "api-key".to_string(),
                    message: format!("failed to read API key: {e}"),
                    help: None,
                    source: Some(Box::new(e)),
                })?;
            let secret = secret.trim();
            if !secret.is_empty() {
                return Ok(secret.to_string());
            }
        }
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolves the API key with an injected environment lookup and output.
pub fn resolve_api_key_with<L, W>(
    explicit: Option<&str>,
    kind: ProviderKind,
    config: &Config,
    lookup: L,
    prompt: &dyn SecretPrompt,
    output: &mut W,
) -> Result<String, GocoError>
where
    L: Fn(&str) -> Option<String>,
    W: Write,
{
    if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
        debug!("Using API key from command line");
        return Ok(key.to_string());
    }

    let env_var = config.api_key_env_var(kind);
    if let Some(key) = lookup(env_var).map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
        debug!("Using API key from {}", env_var);
        return Ok(key);
    }

    info!("{} not set, prompting for {} API key", env_var, kind);
    let key = prompt.prompt_secret(&format!("Enter your {kind} API key"))?;

    let _ = writeln!(
        output,
        "Tip: export {env_var}=<your-key> to skip this prompt next time."
    );
    Ok(key)
}

/// Resolves the API key from the process environment, prompting on the terminal.
pub fn resolve_api_key(
    explicit: Option<&str>,
    kind: ProviderKind,
    config: &Config,
) -> Result<String, GocoError> {
    resolve_api_key_with(
        explicit,
        kind,
        config,
        |var| std::env::var(var).ok(),
        &TerminalPrompt,
        &mut std::io::stderr(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FixedPrompt {
        answer: &'static str,
        asked: Cell<bool>,
    }

    impl FixedPrompt {
        fn new(answer: &'static str) -> Self {
            Self {
                answer,
                asked: Cell::new(false),
            }
        }
    }

    impl SecretPrompt for FixedPrompt {
        fn prompt_secret(&self, _prompt: &str) -> Result<String, GocoError> {
            self.asked.set(true);
            Ok(self.answer.to_string())
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_explicit_key_wins() {
        let prompt = FixedPrompt::new("typed");
        let mut output = Vec::new();

        let key = resolve_api_key_with(
            Some("from-flag"),
            ProviderKind::Gemini,
            &Config::default(),
            |_| Some("from-env".to_string()),
            &prompt,
            &mut output,
        )
        .unwrap();

        assert_eq!(key, "from-flag");
        assert!(!prompt.asked.get());
        assert!(output.is_empty());
    }

    #[test]
    fn test_configured_env_var_is_used() {
        let mut config = Config::default();
        config.general.api_key_groq_env_variable = "TEAM_GROQ".to_string();
        let prompt = FixedPrompt::new("typed");
        let mut output = Vec::new();

        let key = resolve_api_key_with(
            None,
            ProviderKind::Groq,
            &config,
            |var| (var == "TEAM_GROQ").then(|| "gsk_env".to_string()),
            &prompt,
            &mut output,
        )
        .unwrap();

        assert_eq!(key, "gsk_env");
        assert!(!prompt.asked.get());
    }

    #[test]
    fn test_prompts_when_nothing_configured_and_prints_tip() {
        let prompt = FixedPrompt::new("typed-key");
        let mut output = Vec::new();

        let key = resolve_api_key_with(
            Some("  "),
            ProviderKind::Gemini,
            &Config::default(),
            no_env,
            &prompt,
            &mut output,
        )
        .unwrap();

        assert_eq!(key, "typed-key");
        assert!(prompt.asked.get());
        assert!(String::from_utf8(output).unwrap().contains("export GOCO_GEMINI_KEY="));
    }
}
