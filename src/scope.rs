//! Commit scope resolution: which files the generated commit may include.
//!
//! `WorkingTree` stages every tracked modification and commits the full
//! index. `StagedOnly` leaves the index alone and commits exactly the paths
//! that are staged at commit time, so edits made while the message was
//! being generated cannot leak in.
//!
//! `git commit --only -- <paths>` records the working-tree content of each
//! listed path. A file that is only partly staged (`git add -p`) is therefore
//! committed whole, unstaged hunks included.

use std::fmt;
use std::io::Write;

use crate::errors::GocoError;
use crate::executor::{ProcessRunner, forward_output};
use crate::git::GitReader;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitScope {
    WorkingTree,
    StagedOnly,
}

impl CommitScope {
    pub fn from_staged_flag(staged: bool) -> Self {
        if staged {
            CommitScope::StagedOnly
        } else {
            CommitScope::WorkingTree
        }
    }
}

impl fmt::Display for CommitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitScope::WorkingTree => f.write_str("working tree"),
            CommitScope::StagedOnly => f.write_str("staged only"),
        }
    }
}

/// Arguments of the final `git commit` call.
///
/// With `paths`, the commit is an explicit `--only` commit of those paths.
pub fn commit_args(message: &str, paths: Option<&[String]>) -> Vec<String> {
    let mut args = vec!["commit".to_string(), "-m".to_string(), message.to_string()];
    if let Some(paths) = paths {
        args.push("--only".to_string());
        args.push("--".to_string());
        args.extend(paths.iter().cloned());
    }
    args
}

/// What was actually committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub scope: CommitScope,
    /// Paths passed to `--only`; `None` for a full-index commit.
    pub paths: Option<Vec<String>>,
}

/// Runs the staging and commit steps for a scope.
pub struct CommitScopeResolver<'a> {
    runner: &'a dyn ProcessRunner,
}

impl<'a> CommitScopeResolver<'a> {
    pub fn new(runner: &'a dyn ProcessRunner) -> Self {
        Self { runner }
    }

    /// Commits `message` under `scope`, forwarding git's output to the writers.
    pub fn commit<W1: Write, W2: Write>(
        &self,
        scope: CommitScope,
        message: &str,
        stdout: &mut W1,
        stderr: &mut W2,
    ) -> Result<CommitRecord, GocoError> {
        let paths = match scope {
            CommitScope::WorkingTree => {
                self.git(&["add", "-u"], stdout, stderr)?;
                None
            }
            CommitScope::StagedOnly => {
                // Relisted here on purpose: the listing taken before generation
                // may be stale. The index can still change between this call
                // and the commit below.
                let staged = GitReader::new(self.runner).staged_files()?;
                if staged.is_empty() {
                    return Err(GocoError::NoStagedFiles);
                }
                Some(staged)
            }
        };

        let args = commit_args(message, paths.as_deref());
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        info!(
            "Committing ({}){}",
            scope,
            paths
                .as_ref()
                .map(|p| format!(" {} path(s)", p.len()))
                .unwrap_or_default()
        );
        self.git(&args, stdout, stderr)?;

        Ok(CommitRecord { scope, paths })
    }

    fn git<W1: Write, W2: Write>(
        &self,
        args: &[&str],
        stdout: &mut W1,
        stderr: &mut W2,
    ) -> Result<(), GocoError> {
        let command = match args.first() {
            Some(&"commit") => "git commit".to_string(),
            _ => format!("git {}", args.join(" ")),
        };

        let output = self.runner.run("git", args).map_err(|e| GocoError::Git {
            command: command.clone(),
            message: e.to_string(),
            source: Some(Box::new(e)),
        })?;

        forward_output(&output, stdout, stderr).map_err(|message| GocoError::Git {
            command,
            message,
            source: None,
        })
    }
}
