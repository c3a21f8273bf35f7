//! Read-only capture of repository state.
//!
//! All calls shell out to the system `git` so the user's own configuration,
//! hooks and credential setup apply unchanged.

use crate::errors::GocoError;
use crate::executor::{ProcessRunner, failure_message};
use tracing::{debug, info};

/// `git diff` arguments listing the staged paths.
pub const STAGED_FILES_ARGS: [&str; 5] = ["diff", "--name-only", "--cached", "--no-renames", "-z"];

/// Point-in-time view of the repository used to build a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSnapshot {
    pub status: String,
    pub diff: String,
    /// Staged paths in git's own order.
    pub staged_files: Vec<String>,
}

/// Reads status, diff and index contents through a [`ProcessRunner`].
pub struct GitReader<'a> {
    runner: &'a dyn ProcessRunner,
}

impl<'a> GitReader<'a> {
    pub fn new(runner: &'a dyn ProcessRunner) -> Self {
        Self { runner }
    }

    /// Captures status, diff and the staged file list.
    ///
    /// Fails before returning anything if the working tree has no changes,
    /// so no provider call is ever made for an empty change-set.
    pub fn snapshot(&self, staged: bool) -> Result<GitSnapshot, GocoError> {
        let status = self.status()?;
        self.ensure_changes()?;
        let diff = self.diff(staged)?;
        let staged_files = self.staged_files()?;

        info!(
            "Captured snapshot: {} bytes of status, {} bytes of diff, {} staged file(s)",
            status.len(),
            diff.len(),
            staged_files.len()
        );

        Ok(GitSnapshot {
            status,
            diff,
            staged_files,
        })
    }

    /// Human-readable `git status` text.
    pub fn status(&self) -> Result<String, GocoError> {
        self.git(&["status"])
    }

    /// Whether `git status --porcelain` reports anything at all.
    pub fn has_changes(&self) -> Result<bool, GocoError> {
        let porcelain = self.git(&["status", "--porcelain"])?;
        Ok(!porcelain.trim().is_empty())
    }

    /// Fails unless there is something to commit.
    ///
    /// Cheap enough to run before anything interactive, such as prompting
    /// for an API key.
    pub fn ensure_changes(&self) -> Result<(), GocoError> {
        if self.has_changes()? {
            Ok(())
        } else {
            Err(GocoError::git("git status", "no changes detected"))
        }
    }

    /// Diff of the index (`staged`) or of the working tree.
    pub fn diff(&self, staged: bool) -> Result<String, GocoError> {
        if staged {
            self.git(&["diff", "--staged", "--no-color"])
        } else {
            self.git(&["diff", "--no-color"])
        }
    }

    /// Paths currently recorded in the index, in git's order.
    ///
    /// NUL-separated so paths are never C-quoted, and without rename
    /// detection so both sides of a staged move are listed.
    pub fn staged_files(&self) -> Result<Vec<String>, GocoError> {
        let listing = self.git(&STAGED_FILES_ARGS)?;
        Ok(parse_name_list(&listing))
    }

    fn git(&self, args: &[&str]) -> Result<String, GocoError> {
        let command = format!("git {}", args.join(" "));
        debug!("Reading {}", command);

        let output = self.runner.run("git", args).map_err(|e| GocoError::Git {
            command: command.clone(),
            message: e.to_string(),
            source: Some(Box::new(e)),
        })?;

        if !output.status.success() {
            let message = failure_message(&output);
            if message.to_lowercase().contains("not a git repository") {
                return Err(GocoError::NotARepository);
            }
            return Err(GocoError::Git {
                command,
                message,
                source: None,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Splits `--name-only -z` output into paths, dropping empty entries.
pub fn parse_name_list(listing: &str) -> Vec<String> {
    listing
        .split('\0')
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect()
}
