//! Config command - write a config file and prepare the state it points at

use anyhow::{Context, Result, bail};
use careers_watch_adapters::state::JsonFileStore;
use careers_watch_domain::{SnapshotStore, usecases::RunLoopConfig};
use std::path::Path;

use crate::args::{ConfigArgs, ConfigCommands};
use crate::config::{AppConfig, QUERY_ENV};

pub async fn execute(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Init { path, force, query } => init_config(&path, force, query).await,
    }
}

async fn init_config(path: &Path, force: bool, query: Option<String>) -> Result<()> {
    if !force && tokio::fs::try_exists(path).await.unwrap_or(false) {
        bail!(
            "{} already exists, pass --force to replace it",
            path.display()
        );
    }

    let mut config = AppConfig::default();
    config.watch.query = query.filter(|q| !q.trim().is_empty());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, config.to_toml()?)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());

    // Read it back the way `run` will, environment overrides included
    let config = AppConfig::load(Some(path))?;
    let store = JsonFileStore::open(&config.general.state_dir)
        .await
        .context("Failed to initialize state directory")?;
    let known = store.load().await?.len();
    println!(
        "State in {} ({} entries known)",
        config.general.state_dir.display(),
        known
    );

    match RunLoopConfig::new(config.watch.query.unwrap_or_default()) {
        Ok(loop_config) => println!(
            "Watching \"{}\", try 'careers-watch run --once'",
            loop_config.query
        ),
        Err(_) => println!(
            "No query yet: set watch.query in {} or {} before running",
            path.display(),
            QUERY_ENV
        ),
    }

    Ok(())
}
