//! Affinity CLI - Command-line interface for relationship affinity scoring.

use affinity_cli::commands;
use affinity_cli::{Cli, Command, Config, Formatter};
use affinity_engine::AffinityEngine;
use affinity_store::SqliteStore;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Logs go to stderr so they never mix with command output
    let filter = EnvFilter::try_from_env("AFFINITY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> affinity_cli::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Explain => {
            // No store needed
            commands::execute_explain(&formatter).await?;
        }
        cmd => {
            let db_path = match cli.db {
                Some(path) => path,
                None => config.database_path()?,
            };
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            tracing::debug!(database = %db_path.display(), "Opening store");
            let store = SqliteStore::new(&db_path)?;

            match cmd {
                Command::Befriend(args) => {
                    commands::execute_befriend(args, &store, &formatter).await?;
                }
                Command::Unfriend(args) => {
                    commands::execute_unfriend(args, &store, &formatter).await?;
                }
                Command::Send(args) => {
                    commands::execute_send(args, &store, &formatter).await?;
                }
                Command::Friends(args) => {
                    commands::execute_friends(args, &store, &formatter).await?;
                }
                Command::Score(args) => {
                    let engine = AffinityEngine::new(store, config.engine);
                    commands::execute_score(args, &engine, &formatter).await?;
                }
                Command::Rescore(args) => {
                    let engine = AffinityEngine::new(store, config.engine);
                    commands::execute_rescore(args, &engine, &formatter).await?;
                }
                Command::Explain => unreachable!(),
            }
        }
    }

    Ok(())
}
