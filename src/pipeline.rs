//! The generate-and-commit run.
//!
//! Stages run strictly in order: snapshot, model validation, generation,
//! optional edit, commit. Each returns a classified error, and nothing here
//! prints diagnostics or exits the process.

use std::io::Write;

use tracing::info;

use crate::editor::MessageEditor;
use crate::errors::GocoError;
use crate::executor::ProcessRunner;
use crate::git::GitReader;
use crate::progress::{NoProgress, Spinner, run_with_progress};
use crate::providers::{GenerationRequest, Provider};
use crate::scope::{CommitRecord, CommitScope, CommitScopeResolver};
use crate::validator;

/// User choices for one generate run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    pub staged: bool,
    pub edit: bool,
    pub verbose: bool,
    pub commit_type: Option<String>,
    pub breaking_change: bool,
    pub instructions: Option<String>,
}

impl GenerateOptions {
    pub fn scope(&self) -> CommitScope {
        CommitScope::from_staged_flag(self.staged)
    }

    /// Free-form instructions with `--type` and `--breaking-change` folded in.
    pub fn custom_instructions(&self) -> Option<String> {
        let mut lines = Vec::new();
        if let Some(commit_type) = self.commit_type.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            lines.push(format!("Use commit type: {commit_type}"));
        }
        if self.breaking_change {
            lines.push(
                "Mark this as a breaking change (add ! after the type and a BREAKING CHANGE footer)"
                    .to_string(),
            );
        }
        if let Some(extra) = self.instructions.as_deref().map(str::trim).filter(|i| !i.is_empty()) {
            lines.push(extra.to_string());
        }

        if lines.is_empty() { None } else { Some(lines.join("\n")) }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub message: String,
    pub record: CommitRecord,
}

pub struct CommitPipeline<'a> {
    provider: &'a dyn Provider,
    runner: &'a dyn ProcessRunner,
    show_progress: bool,
}

impl<'a> CommitPipeline<'a> {
    pub fn new(provider: &'a dyn Provider, runner: &'a dyn ProcessRunner) -> Self {
        Self {
            provider,
            runner,
            show_progress: true,
        }
    }

    /// Disables the terminal spinner (tests, non-interactive use).
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub async fn run<W1: Write, W2: Write>(
        &self,
        options: &GenerateOptions,
        stdout: &mut W1,
        stderr: &mut W2,
    ) -> Result<CommitOutcome, GocoError> {
        let scope = options.scope();
        info!(
            "Starting run with {} ({}), scope: {}",
            self.provider.kind(),
            self.provider.model(),
            scope
        );

        let snapshot = GitReader::new(self.runner).snapshot(options.staged)?;
        if scope == CommitScope::StagedOnly && snapshot.staged_files.is_empty() {
            return Err(GocoError::NoStagedFiles);
        }

        if options.verbose {
            let _ = writeln!(stdout, "Git status:\n{}", snapshot.status);
            let _ = writeln!(stdout, "Git diff:\n{}", snapshot.diff);
        }

        validator::validate_model(self.provider, self.provider.model()).await?;

        let request = GenerationRequest::from_snapshot(&snapshot, options.custom_instructions());
        let message = self.generate(&request).await?;

        let _ = writeln!(stdout, "Generated commit message:\n\n{message}\n");

        let message = if options.edit {
            let edited = MessageEditor::new(self.runner).edit(&message)?;
            if edited != message {
                let _ = writeln!(stdout, "Edited commit message:\n\n{edited}\n");
            }
            edited
        } else {
            message
        };

        let record = CommitScopeResolver::new(self.runner).commit(scope, &message, stdout, stderr)?;
        info!("Commit created");

        Ok(CommitOutcome { message, record })
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GocoError> {
        let work = self.provider.generate_commit_message(request);
        let result = if self.show_progress {
            run_with_progress(Spinner::new("Generating commit message..."), work).await
        } else {
            run_with_progress(NoProgress, work).await
        };

        result.map_err(|e| GocoError::Api {
            message: "failed to generate commit message".to_string(),
            source: Some(Box::new(e)),
        })
    }
}
