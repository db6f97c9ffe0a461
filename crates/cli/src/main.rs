//! careers-watch CLI entry point

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod args;
mod commands;
mod config;

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Loaded before logging so RUST_LOG can come from .env; a missing file is fine
    let dotenv_error = dotenvy::dotenv().err().filter(|e| !e.not_found());

    let cli = Cli::parse();

    // Initialize logging
    let log_level = match (cli.log_level.as_deref(), cli.verbose) {
        (Some(level), _) => level,
        (None, true) => "debug",
        (None, false) => "info",
    };
    init_logging(log_level)?;

    if let Some(e) = dotenv_error {
        tracing::warn!(error = %e, "Failed to load .env file");
    }

    // Execute command
    match cli.command {
        Commands::Run(args) => commands::run::execute(args, cli.config).await,
        Commands::Changes(args) => commands::changes::execute(args, cli.config).await,
        Commands::Config(args) => commands::config::execute(args).await,
        Commands::Doctor(args) => commands::doctor::execute(args, cli.config).await,
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}
