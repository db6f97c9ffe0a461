//! Changes command - show the last recorded diff

use anyhow::{Context, Result};
use careers_watch_adapters::state::JsonFileStore;
use careers_watch_domain::{ChangeLog, usecases::format_report};
use std::path::PathBuf;

use crate::args::ChangesArgs;
use crate::config::AppConfig;

pub async fn execute(args: ChangesArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let store = JsonFileStore::new(&config.general.state_dir);

    let changes = store
        .last()
        .await
        .with_context(|| format!("Failed to read {}", store.changes_path().display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&changes)?);
    } else if changes.is_empty() {
        println!("No changes recorded");
    } else {
        print!("{}", format_report(&changes));
    }

    Ok(())
}
