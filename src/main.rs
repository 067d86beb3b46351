use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use memebot::app::AppContext;
use memebot::cli::{commands, Cli, Commands, MemeAction};
use memebot::config::Config;

fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let ctx = AppContext::new(config, cli.db)?;

    match cli.command {
        Commands::Browse { mode, out } => {
            commands::browse(&ctx, &mode, &out).await?;
        }
        Commands::Search { keywords, out } => {
            commands::search(&ctx, &keywords, &out).await?;
        }
        Commands::Chat { out } => {
            commands::chat(&ctx, &out).await?;
        }
        Commands::Trends { limit, json } => {
            commands::trends(&ctx, limit, json)?;
        }
        Commands::Posts { limit, json } => {
            commands::posts(&ctx, limit, json)?;
        }
        Commands::Memes { action } => match action {
            MemeAction::List { limit, json } => commands::memes_list(&ctx, limit, json)?,
            MemeAction::Export { id, path } => commands::memes_export(&ctx, id, &path).await?,
        },
        Commands::Stats => {
            commands::stats(&ctx)?;
        }
    }

    Ok(())
}
