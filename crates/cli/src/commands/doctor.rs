//! Doctor command - check that a watch cycle could run with the current setup

use anyhow::Result;
use careers_watch_adapters::{listing::listing_url, state::JsonFileStore};
use careers_watch_domain::{
    ChangeAction, ChangeLog, SnapshotStore, usecases::RunLoopConfig,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::args::DoctorArgs;
use crate::commands::run::{build_listing_source, load_env, poll_interval};
use crate::config::{AppConfig, QUERY_ENV};

/// Ordered by severity so the report's overall status is the worst check
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
enum Status {
    Ok,
    Warn,
    Error,
}

impl Status {
    fn symbol(self) -> &'static str {
        match self {
            Status::Ok => "✓",
            Status::Warn => "⚠",
            Status::Error => "✗",
        }
    }
}

#[derive(Debug, Serialize)]
struct Check {
    name: &'static str,
    status: Status,
    message: String,
}

impl Check {
    fn new(name: &'static str, status: Status, message: impl Into<String>) -> Self {
        Self {
            name,
            status,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    checks: Vec<Check>,
    overall: Status,
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut checks = Vec::new();

    match AppConfig::load(config_path.as_deref()) {
        Ok(config) => {
            checks.push(Check::new("config", Status::Ok, "Configuration loaded"));
            checks.push(check_watch(&config));
            checks.push(check_state(&config.general.state_dir).await);
            checks.push(check_source(&config));
            checks.push(check_telegram(&config));
        }
        Err(e) => checks.push(Check::new("config", Status::Error, format!("{:#}", e))),
    }

    let overall = checks
        .iter()
        .map(|check| check.status)
        .max()
        .unwrap_or(Status::Ok);
    let report = DoctorReport { checks, overall };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for check in &report.checks {
            println!("{} {:<9} {}", check.status.symbol(), check.name, check.message);
        }
        println!("{} overall: {:?}", overall.symbol(), overall);
    }

    if overall == Status::Error {
        std::process::exit(1);
    }

    Ok(())
}

/// The same query and interval validation `run` applies
fn check_watch(config: &AppConfig) -> Check {
    let query = config.watch.query.clone().unwrap_or_default();
    let loop_config = match RunLoopConfig::new(query) {
        Ok(loop_config) => loop_config,
        Err(e) => {
            return Check::new(
                "watch",
                Status::Error,
                format!("{} (set watch.query or {})", e, QUERY_ENV),
            );
        }
    };

    match poll_interval(config.watch.interval_secs) {
        Ok(period) => Check::new(
            "watch",
            Status::Ok,
            format!("\"{}\" every {}s", loop_config.query, period.as_secs()),
        ),
        Err(e) => Check::new("watch", Status::Error, e.to_string()),
    }
}

async fn check_state(dir: &Path) -> Check {
    if !dir.exists() {
        return Check::new(
            "state",
            Status::Warn,
            format!("{} does not exist yet, the first run creates it", dir.display()),
        );
    }

    let store = JsonFileStore::new(dir);
    let known = match store.load().await {
        Ok(snapshot) => snapshot.len(),
        Err(e) => return Check::new("state", Status::Error, e.to_string()),
    };
    let last = match store.last().await {
        Ok(changes) => changes,
        Err(e) => return Check::new("state", Status::Error, e.to_string()),
    };

    let added = last
        .iter()
        .filter(|record| record.action == ChangeAction::Added)
        .count();
    Check::new(
        "state",
        Status::Ok,
        format!(
            "{} entries known, last change: {} added, {} removed",
            known,
            added,
            last.len() - added
        ),
    )
}

fn check_source(config: &AppConfig) -> Check {
    let query = config.watch.query.as_deref().unwrap_or_default();
    let url = match listing_url(&config.source.base_url, query) {
        Ok(url) => url,
        Err(e) => return Check::new("source", Status::Error, e.to_string()),
    };

    if let Err(e) = build_listing_source(config) {
        return Check::new("source", Status::Error, format!("{:#}", e));
    }

    let command = config.source.command.as_str();
    if config.source.kind.trim() == "command" && !on_path(command) {
        return Check::new(
            "source",
            Status::Warn,
            format!("{} not found, fetching {} will fail", command, url),
        );
    }

    Check::new(
        "source",
        Status::Ok,
        format!("{} source for {}", config.source.kind.trim(), url),
    )
}

fn on_path(command: &str) -> bool {
    let path = Path::new(command);
    if path.components().count() > 1 {
        return path.is_file();
    }

    std::env::var_os("PATH")
        .is_some_and(|paths| std::env::split_paths(&paths).any(|dir| dir.join(command).is_file()))
}

fn check_telegram(config: &AppConfig) -> Check {
    let telegram = &config.telegram;
    let missing: Vec<&str> = [
        (telegram.token_env.as_str(), "telegram token"),
        (telegram.chat_id_env.as_str(), "telegram chat id"),
    ]
    .into_iter()
    .filter(|(var, what)| load_env(var, what).is_err())
    .map(|(var, _)| var)
    .collect();

    match (telegram.enabled, missing.is_empty()) {
        (_, true) => Check::new("telegram", Status::Ok, "Credentials found"),
        (true, false) => Check::new(
            "telegram",
            Status::Warn,
            format!("Missing {}, changes will only be logged", missing.join(", ")),
        ),
        (false, false) => Check::new("telegram", Status::Ok, "Disabled"),
    }
}
