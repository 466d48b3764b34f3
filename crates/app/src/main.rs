//! TokenWarden - delegated OAuth token lifecycle CLI

use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use tokenwarden_app::cli::{Cli, Commands};
use tokenwarden_app::commands::{self, CommandOutput};
use tokenwarden_app::utils::logging::{init_tracing, LogFormat};
use tokenwarden_app::AppContext;
use tokenwarden_infra::config;

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    init_tracing(LogFormat::from_env());
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(err) => tracing::debug!(error = %err, "no .env file loaded"),
    }

    let cli = Cli::parse();
    match run(cli).await {
        Ok(CommandOutput::Success(value)) => {
            match serde_json::to_string_pretty(&value) {
                Ok(text) => println!("{text}"),
                Err(_) => println!("{value}"),
            }
            ExitCode::SUCCESS
        }
        Ok(CommandOutput::NeedsAuthorization(user_id)) => {
            eprintln!("{}", CommandOutput::authorization_hint(user_id));
            ExitCode::FAILURE
        }
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "command failed");
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<CommandOutput> {
    let config = match cli.config {
        Some(path) => config::load_from_file(Some(path))?,
        None => config::load()?,
    };
    let ctx = AppContext::new_with_config(config).context("initialising application context")?;

    let output = match &cli.command {
        Commands::Migrate => commands::migrate(&ctx),
        Commands::Token(args) => commands::token(&ctx, args).await,
        Commands::Refresh(args) => commands::refresh(&ctx, args).await,
        Commands::SetPermissions(args) => commands::set_permissions(&ctx, args).await,
    };

    ctx.shutdown().await;
    output
}
