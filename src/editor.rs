//! Optional hand edit of the generated message in the user's editor.
//!
//! The message is written to a process-unique temporary file that is removed
//! when the edit finishes, whatever the outcome.

use std::fs;
use std::io::Write;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::errors::GocoError;
use crate::executor::ProcessRunner;

/// Editors tried, in order, when neither `EDITOR` nor `VISUAL` is set.
pub const FALLBACK_EDITORS: &[&str] = &["vim", "nano", "vi"];

/// Picks the editor command: `EDITOR`, then `VISUAL`, then the first
/// installed fallback.
pub fn resolve_editor<L, E>(lookup: L, exists: E) -> Result<String, GocoError>
where
    L: Fn(&str) -> Option<String>,
    E: Fn(&str) -> bool,
{
    for var in ["EDITOR", "VISUAL"] {
        if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
            debug!("Using editor from {}: {}", var, value);
            return Ok(value.trim().to_string());
        }
    }

    FALLBACK_EDITORS
        .iter()
        .find(|editor| exists(editor))
        .map(|editor| editor.to_string())
        .ok_or(GocoError::NoEditor)
}

/// Opens messages in an external editor through a [`ProcessRunner`].
pub struct MessageEditor<'a> {
    runner: &'a dyn ProcessRunner,
}

impl<'a> MessageEditor<'a> {
    pub fn new(runner: &'a dyn ProcessRunner) -> Self {
        Self { runner }
    }

    /// Resolves the editor from the process environment and edits `message`.
    pub fn edit(&self, message: &str) -> Result<String, GocoError> {
        self.edit_resolved(|var| std::env::var(var).ok(), message)
    }

    /// Resolves the editor through `lookup` and the runner's PATH check, then
    /// edits `message`.
    pub fn edit_resolved<L>(&self, lookup: L, message: &str) -> Result<String, GocoError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let editor = resolve_editor(lookup, |program| self.runner.program_exists(program))?;
        self.edit_with(&editor, message)
    }

    /// Edits `message` with `editor` (which may carry arguments, e.g. `code -w`).
    ///
    /// A blank result keeps the original message.
    pub fn edit_with(&self, editor: &str, message: &str) -> Result<String, GocoError> {
        let mut file = tempfile::Builder::new()
            .prefix("goco-commit-")
            .suffix(".txt")
            .tempfile()
            .map_err(|e| editor_error("failed to create temporary file", e))?;
        write_message(&mut file, message)?;

        let path = file.path().to_string_lossy().into_owned();
        let mut parts = editor.split_whitespace();
        let program = parts.next().ok_or(GocoError::NoEditor)?;
        let mut args: Vec<&str> = parts.collect();
        args.push(&path);

        info!("Opening {} in {}", path, program);
        let status = self
            .runner
            .run_attached(program, &args)
            .map_err(|e| editor_error(&format!("failed to run editor '{editor}'"), e))?;
        if !status.success() {
            return Err(GocoError::Editor {
                message: format!("editor '{editor}' exited with {status}"),
                source: None,
            });
        }

        let edited = fs::read_to_string(file.path())
            .map_err(|e| editor_error("failed to read edited message", e))?;
        let edited = edited.trim();

        if edited.is_empty() {
            info!("Edited message is empty, keeping the generated one");
            Ok(message.to_string())
        } else {
            Ok(edited.to_string())
        }
    }
}

fn write_message(file: &mut NamedTempFile, message: &str) -> Result<(), GocoError> {
    file.write_all(message.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| editor_error("failed to write temporary file", e))
}

fn editor_error(message: &str, err: std::io::Error) -> GocoError {
    GocoError::Editor {
        message: format!("{message}: {err}"),
        source: Some(Box::new(err)),
    }
}
