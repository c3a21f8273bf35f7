//! goco - Conventional Commit messages generated from your changes.
//!
//! goco reads the repository's status and diff, asks an AI backend (Gemini
//! or Groq) for a Conventional Commit message, optionally lets you edit it,
//! and commits.
//!
//! # Architecture
//!
//! - [`git`] - Read-only capture of status, diff and staged files
//! - [`providers`] - The [`providers::Provider`] trait and its backends
//! - [`validator`] - Model resolution and existence check
//! - [`progress`] - Spinner that runs beside the generation call
//! - [`editor`] - Optional hand edit in `$EDITOR`
//! - [`scope`] - Which files the commit may include
//! - [`pipeline`] - Runs the stages above in order
//! - [`errors`] - Classified errors and exit codes
//! - [`config`], [`credentials`] - Config file and API key resolution
//! - [`executor`], [`http_client`] - Process and HTTP seams
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use goco::executor::SystemProcessRunner;
//! use goco::http_client::ReqwestHttpClient;
//! use goco::pipeline::{CommitPipeline, GenerateOptions};
//! use goco::providers::{ProviderKind, build_provider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), goco::errors::GocoError> {
//!     let http = Arc::new(ReqwestHttpClient::new());
//!     let provider = build_provider(ProviderKind::Gemini, "key", "gemini-2.5-flash", http)?;
//!     let runner = SystemProcessRunner::new();
//!
//!     let options = GenerateOptions { staged: true, ..Default::default() };
//!     CommitPipeline::new(provider.as_ref(), &runner)
//!         .run(&options, &mut std::io::stdout(), &mut std::io::stderr())
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod credentials;
pub mod editor;
pub mod errors;
pub mod executor;
pub mod git;
pub mod http_client;
pub mod pipeline;
pub mod progress;
pub mod providers;
pub mod scope;
pub mod validator;
