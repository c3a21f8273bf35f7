//! Classified errors and the single place that turns them into exit codes.
//!
//! Every stage of the pipeline returns a [`GocoError`]. Nothing below `main`
//! prints or exits; [`report`] is the only presenter.

use std::io::Write;

use thiserror::Error;

/// Boxed underlying cause carried by a classified error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub const EXIT_OK: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
// Reserved. No failure path produces these yet.
pub const EXIT_CANCEL: i32 = 2;
pub const EXIT_AUTH: i32 = 4;
pub const EXIT_PENDING: i32 = 8;

/// Classified failure of a goco run.
#[derive(Error, Debug)]
pub enum GocoError {
    /// Bad flag/argument combination or an unavailable model.
    #[error("{field}: {message}{}", help_suffix(.help))]
    Validation {
        field: String,
        message: String,
        help: Option<String>,
        #[source]
        source: Option<BoxError>,
    },

    /// Malformed persisted configuration.
    #[error("config error ({field}): {message}")]
    Config {
        field: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Backend construction or initialization failure.
    #[error("provider error ({provider}): {message}")]
    Provider {
        provider: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A git subcommand failed, or git reported a condition we cannot commit from.
    #[error("git error: {command} failed: {message}")]
    Git {
        command: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The generation call itself failed.
    #[error("API error: {message}{}", cause_suffix(.source))]
    Api {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The editor ran but the edit could not be completed.
    #[error("editor error: {message}")]
    Editor {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("no text editor available")]
    NoEditor,

    #[error("not a git repository")]
    NotARepository,

    #[error("no staged files found")]
    NoStagedFiles,
}

fn help_suffix(help: &Option<String>) -> String {
    match help {
        Some(help) if !help.is_empty() => format!("\n\nHelp: {help}"),
        _ => String::new(),
    }
}

fn cause_suffix(source: &Option<BoxError>) -> String {
    match source {
        Some(source) => format!(": {source}"),
        None => String::new(),
    }
}

impl GocoError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        GocoError::Validation {
            field: field.into(),
            message: message.into(),
            help: None,
            source: None,
        }
    }

    pub fn git(command: impl Into<String>, message: impl Into<String>) -> Self {
        GocoError::Git {
            command: command.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Remediation text printed after the error line, if any.
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            GocoError::NoEditor => Some(
                "Please set the EDITOR or VISUAL environment variable, or ensure a text editor (vim, nano, vi) is installed.",
            ),
            GocoError::NotARepository => {
                Some("Please run this command from within a git repository.")
            }
            GocoError::NoStagedFiles => {
                Some("Stage your changes using 'git add <files>' before running goco.")
            }
            _ => None,
        }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            GocoError::Validation { .. }
            | GocoError::Config { .. }
            | GocoError::Provider { .. }
            | GocoError::Git { .. }
            | GocoError::Api { .. }
            | GocoError::Editor { .. }
            | GocoError::NoEditor
            | GocoError::NotARepository
            | GocoError::NoStagedFiles => EXIT_ERROR,
        }
    }
}

/// Print `err` with its remediation text and return the exit code to use.
pub fn report<W: Write>(err: &GocoError, output: &mut W) -> i32 {
    let _ = match err.guidance() {
        Some(guidance) => writeln!(output, "Error: {err}\n\n{guidance}"),
        None => writeln!(output, "Error: {err}"),
    };
    err.exit_code()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn reported(err: &GocoError) -> (i32, String) {
        let mut out = Vec::new();
        let code = report(err, &mut out);
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_validation_error_includes_help() {
        let err = GocoError::Validation {
            field: "model".to_string(),
            message: "model foo not available".to_string(),
            help: Some("run `goco models`".to_string()),
            source: None,
        };
        assert_eq!(
            err.to_string(),
            "model: model foo not available\n\nHelp: run `goco models`"
        );
    }

    #[test]
    fn test_validation_error_without_help() {
        let err = GocoError::validation("provider", "unsupported provider: openai");
        assert_eq!(err.to_string(), "provider: unsupported provider: openai");
    }

    #[test]
    fn test_git_error_names_command() {
        let err = GocoError::git("git status", "no changes detected");
        assert_eq!(err.to_string(), "git error: git status failed: no changes detected");
    }

    #[test]
    fn test_api_error_keeps_cause_inspectable() {
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
        let err = GocoError::Api {
            message: "failed to generate commit message".to_string(),
            source: Some(Box::new(cause)),
        };

        assert!(err.to_string().contains("connection reset"));
        let source = err.source().expect("cause should be preserved");
        assert!(source.downcast_ref::<std::io::Error>().is_some());
    }

    #[test]
    fn test_sentinels_get_guidance() {
        let (code, text) = reported(&GocoError::NoEditor);
        assert_eq!(code, EXIT_ERROR);
        assert!(text.starts_with("Error: no text editor available"));
        assert!(text.contains("EDITOR or VISUAL"));

        let (_, text) = reported(&GocoError::NotARepository);
        assert!(text.contains("from within a git repository"));

        let (_, text) = reported(&GocoError::NoStagedFiles);
        assert!(text.contains("git add <files>"));
    }

    #[test]
    fn test_every_class_maps_to_generic_failure() {
        let errors = vec![
            GocoError::validation("model", "bad"),
            GocoError::Config {
                field: "General".to_string(),
                message: "bad toml".to_string(),
                source: None,
            },
            GocoError::Provider {
                provider: "gemini".to_string(),
                message: "no key".to_string(),
                source: None,
            },
            GocoError::git("git diff", "exit 128"),
            GocoError::Api {
                message: "boom".to_string(),
                source: None,
            },
            GocoError::Editor {
                message: "exit 1".to_string(),
                source: None,
            },
        ];

        for err in &errors {
            let (code, text) = reported(err);
            assert_eq!(code, EXIT_ERROR);
            assert_eq!(text, format!("Error: {err}\n"));
        }
    }

    #[test]
    fn test_reserved_codes_are_distinct_bits() {
        assert_eq!(EXIT_OK, 0);
        assert_eq!(EXIT_CANCEL | EXIT_AUTH | EXIT_PENDING, 14);
    }
}
