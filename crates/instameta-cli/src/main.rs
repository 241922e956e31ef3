//! instameta plugin binary
//!
//! Stash runs this with the plugin input JSON on stdin. The `task` command
//! (default) handles tasks and hooks, `scrape` turns a post URL into a scraped
//! fragment.

mod cli;
mod logging;

use std::io::Read;
use std::process::ExitCode;

use clap::Parser;
use instameta_core::{
    read_scrape_url, scrape_post, InstagramSource, InstametaConfig, InstametaError, Invocation,
    Pipeline, PluginInput, PluginOutput, Result, ScrapedFragment, StashClient,
};

use cli::{CliArgs, Command};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    logging::init();
    let cli = CliArgs::parse();

    let input = match read_stdin() {
        Ok(input) => input,
        Err(e) => {
            tracing::error!("{}", e);
            if cli.command().exits_nonzero_on_failure() {
                println!("{}", PluginOutput::failure(&e).to_json());
                return ExitCode::FAILURE;
            }
            println!("{{}}");
            return ExitCode::SUCCESS;
        }
    };

    match cli.command() {
        Command::Task => run_task(&cli, &input).await,
        Command::Scrape => run_scrape(&cli, &input).await,
    }
}

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| InstametaError::Input(format!("cannot read stdin: {}", e)))?;
    Ok(input)
}

/// Configuration file (if any) with `IG_SESSIONID` applied on top
fn load_config(cli: &CliArgs) -> Result<InstametaConfig> {
    let config = match &cli.config {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            InstametaConfig::from_file(path)?
        }
        None => InstametaConfig::default(),
    };
    Ok(config.with_session_id(std::env::var("IG_SESSIONID").ok()))
}

async fn run_task(cli: &CliArgs, input: &str) -> ExitCode {
    let output = match task(cli, input).await {
        Ok(message) => {
            tracing::info!("{}", message);
            PluginOutput::success(message)
        }
        Err(e) => {
            tracing::error!("{}", e);
            PluginOutput::failure(&e)
        }
    };
    println!("{}", output.to_json());

    if output.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

async fn task(cli: &CliArgs, input: &str) -> Result<String> {
    let input = PluginInput::parse(input)?;
    let (target, args) = match input.invocation()? {
        Invocation::IgnoredHook { hook_type } => {
            tracing::debug!("Ignoring hook {}", hook_type);
            return Ok(format!("Ignored hook {}", hook_type));
        }
        Invocation::Hook {
            event,
            target,
            args,
        } => {
            tracing::info!("Hook {} for {}", event.as_str(), target);
            (target, args)
        }
        Invocation::Task { target, args } => (target, args),
    };

    let config = load_config(cli)?;
    let host = StashClient::new(input.server_connection.clone(), &config.host)?;
    tracing::debug!("Stash endpoint {}", host.endpoint());
    let source = InstagramSource::native(config.instagram)?;

    let report = Pipeline::new(&host, &source).run(&target, &args).await?;
    Ok(report.summary())
}

async fn run_scrape(cli: &CliArgs, input: &str) -> ExitCode {
    match scrape(cli, input).await {
        Ok(fragment) => {
            let json = serde_json::to_string(&fragment).unwrap_or_else(|_| "{}".to_string());
            println!("{}", json);
        }
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            println!("{{}}");
        }
    }
    ExitCode::SUCCESS
}

async fn scrape(cli: &CliArgs, input: &str) -> Result<ScrapedFragment> {
    let url = read_scrape_url(input).ok_or(InstametaError::NoUrlFound)?;
    let config = load_config(cli)?;
    let source = InstagramSource::native(config.instagram)?;
    let post = scrape_post(&source, &url, None).await?;
    Ok(ScrapedFragment::from(&post))
}
