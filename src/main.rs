use std::io;
use std::sync::Arc;

use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::info;
use tracing_subscriber::EnvFilter;

use goco::config::Config;
use goco::credentials::resolve_api_key;
use goco::errors::{self, GocoError};
use goco::executor::SystemProcessRunner;
use goco::git::GitReader;
use goco::http_client::{HttpClient, ReqwestHttpClient};
use goco::pipeline::{CommitPipeline, GenerateOptions};
use goco::providers::{ProviderKind, build_provider};
use goco::validator::resolve_model;

/// Groq's catalogue is static, so listing it needs no real key.
const LISTING_PLACEHOLDER_KEY: &str = "unused";

fn provider_arg() -> Arg {
    Arg::new("provider")
        .short('p')
        .long("provider")
        .help("AI provider to use (gemini, groq)")
        .value_name("PROVIDER")
        .num_args(1)
}

fn generate_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("api-key")
            .short('k')
            .long("api-key")
            .help("API key for the provider (overrides the configured environment variable)")
            .value_name("KEY")
            .num_args(1))
        .arg(provider_arg())
        .arg(Arg::new("model")
            .short('m')
            .long("model")
            .help("Model to generate with (defaults to the provider's default)")
            .value_name("MODEL")
            .num_args(1))
        .arg(Arg::new("type")
            .short('t')
            .long("type")
            .help("Commit type to use (feat, fix, chore, ...)")
            .value_name("TYPE")
            .num_args(1))
        .arg(Arg::new("breaking-change")
            .short('b')
            .long("breaking-change")
            .help("Mark the commit as a breaking change")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("staged")
            .short('s')
            .long("staged")
            .visible_alias("stagged")
            .help("Only use and commit the currently staged changes")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("edit")
            .short('e')
            .long("edit")
            .help("Edit the generated message in $EDITOR before committing")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("instructions")
            .short('i')
            .long("instructions")
            .help("Extra instructions for the AI")
            .value_name("TEXT")
            .num_args(1))
}

fn cli() -> Command {
    let verbose = Arg::new("verbose")
        .long("verbose")
        .help("Show the captured status and diff, and debug logs")
        .action(ArgAction::SetTrue)
        .global(true);

    generate_args(Command::new("goco")
        .about("Generate Conventional Commit messages with AI and commit them")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(verbose))
        .subcommand(generate_args(Command::new("generate")
            .about("Generate a commit message and commit (default)")))
        .subcommand(Command::new("models")
            .about("List the models a provider offers")
            .arg(provider_arg())
            .arg(Arg::new("api-key")
                .short('k')
                .long("api-key")
                .help("API key for the provider")
                .value_name("KEY")
                .num_args(1)))
        .subcommand(Command::new("config")
            .about("Show configuration information")
            .arg(Arg::new("init")
                .long("init")
                .help("Write a default config file")
                .action(ArgAction::SetTrue)))
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "goco=debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn selected_provider(matches: &ArgMatches, config: &Config) -> Result<ProviderKind, GocoError> {
    matches
        .get_one::<String>("provider")
        .map(String::as_str)
        .unwrap_or_else(|| config.get_default_provider())
        .parse()
}

async fn generate(matches: &ArgMatches, config: &Config) -> Result<(), GocoError> {
    let kind = selected_provider(matches, config)?;
    let model = resolve_model(matches.get_one::<String>("model").map(String::as_str), kind);
    let runner = SystemProcessRunner::new();

    // Report a missing repository or a clean tree before asking for a key.
    GitReader::new(&runner).ensure_changes()?;

    let api_key = resolve_api_key(
        matches.get_one::<String>("api-key").map(String::as_str),
        kind,
        config,
    )?;

    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let provider = build_provider(kind, &api_key, &model, http)?;

    let options = GenerateOptions {
        staged: matches.get_flag("staged"),
        edit: matches.get_flag("edit"),
        verbose: matches.get_flag("verbose"),
        commit_type: matches.get_one::<String>("type").cloned(),
        breaking_change: matches.get_flag("breaking-change"),
        instructions: matches.get_one::<String>("instructions").cloned(),
    };

    CommitPipeline::new(provider.as_ref(), &runner)
        .run(&options, &mut io::stdout(), &mut io::stderr())
        .await?;
    Ok(())
}

async fn list_models(matches: &ArgMatches, config: &Config) -> Result<(), GocoError> {
    let kind = selected_provider(matches, config)?;
    let explicit = matches.get_one::<String>("api-key").map(String::as_str);
    let api_key = match kind {
        ProviderKind::Groq => explicit.unwrap_or(LISTING_PLACEHOLDER_KEY).to_string(),
        ProviderKind::Gemini => resolve_api_key(explicit, kind, config)?,
    };

    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let provider = build_provider(kind, &api_key, kind.default_model(), http)?;
    let models = provider.list_models().await.map_err(|e| GocoError::Api {
        message: "failed to list models".to_string(),
        source: Some(Box::new(e)),
    })?;

    println!("Available {} models:", kind);
    for model in &models {
        println!("  {model}");
    }
    println!("\nUse one with: goco --provider {} --model <MODEL>", kind.as_str());
    Ok(())
}

fn config_command(matches: &ArgMatches) -> Result<(), GocoError> {
    if matches.get_flag("init") {
        let path = Config::default().save()?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }
    Config::show_config_info()
}

async fn run(matches: ArgMatches) -> Result<(), GocoError> {
    match matches.subcommand() {
        Some(("config", sub)) => config_command(sub),
        Some(("models", sub)) => list_models(sub, &Config::load()?).await,
        Some(("generate", sub)) => generate(sub, &Config::load()?).await,
        _ => generate(&matches, &Config::load()?).await,
    }
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();
    let verbose = matches.get_flag("verbose")
        || matches
            .subcommand()
            .is_some_and(|(_, sub)| sub.get_flag("verbose"));
    init_tracing(verbose);
    info!("goco {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(matches).await {
        std::process::exit(errors::report(&e, &mut io::stderr()));
    }
}
