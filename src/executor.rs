//! Process execution seam for git and the interactive editor.
//!
//! Everything that spawns a child process goes through [`ProcessRunner`] so
//! the git reader, the commit scope resolver and the editor can be tested
//! without touching a real repository or terminal.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output};
use tracing::{debug, error};

// =============================================================================
// Traits for Dependency Injection
// =============================================================================

/// Trait for running system processes.
pub trait ProcessRunner: Send + Sync {
    /// Executes a command and captures its output.
    fn run(&self, program: &str, args: &[&str]) -> io::Result<Output>;

    /// Executes a command attached to the current terminal's standard streams.
    fn run_attached(&self, program: &str, args: &[&str]) -> io::Result<ExitStatus>;

    /// Checks if a program exists in PATH.
    fn program_exists(&self, program: &str) -> bool;
}

// =============================================================================
// Default Implementation
// =============================================================================

/// Default process runner using `std::process::Command`.
///
/// When a working directory is pinned, every child process starts there;
/// otherwise children inherit the current directory.
#[derive(Debug, Default, Clone)]
pub struct SystemProcessRunner {
    working_dir: Option<PathBuf>,
}

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every command inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            working_dir: Some(dir.as_ref().to_path_buf()),
        }
    }

    fn command(&self, program: &str, args: &[&str]) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<Output> {
        debug!("Running {} {:?}", program, args);
        self.command(program, args).output()
    }

    fn run_attached(&self, program: &str, args: &[&str]) -> io::Result<ExitStatus> {
        debug!("Running {} {:?} attached to terminal", program, args);
        self.command(program, args).status()
    }

    fn program_exists(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Forwards a finished command's output to the given writers.
///
/// Returns the trimmed stderr as the error when the command failed, so the
/// caller can classify it.
pub fn forward_output<W1: io::Write, W2: io::Write>(
    output: &Output,
    stdout: &mut W1,
    stderr: &mut W2,
) -> Result<(), String> {
    write_lossy(stdout, &output.stdout);
    write_lossy(stderr, &output.stderr);

    if output.status.success() {
        Ok(())
    } else {
        error!("Command failed with status: {}", output.status);
        Err(failure_message(output))
    }
}

fn write_lossy<W: io::Write>(writer: &mut W, bytes: &[u8]) {
    if !bytes.is_empty() {
        let _ = write!(writer, "{}", String::from_utf8_lossy(bytes));
    }
}

/// Human description of why a captured command failed.
pub fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("exited with {}", output.status)
    } else {
        stderr.to_string()
    }
}
