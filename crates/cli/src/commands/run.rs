//! Run command - fetch, diff, notify and persist, once or in a loop

use anyhow::{Context, Result, bail};
use careers_watch_adapters::{
    listing::{CommandListingSource, HttpListingSource},
    notify::TelegramNotifier,
    state::JsonFileStore,
};
use careers_watch_domain::{
    CycleOutcome, ListingSource, Notifier,
    usecases::{ConfigError, RunLoop, RunLoopConfig},
};
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::args::RunArgs;
use crate::config::{AppConfig, QUERY_ENV};

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let query = args
        .query
        .clone()
        .or_else(|| config.watch.query.clone())
        .unwrap_or_default();
    let loop_config = RunLoopConfig::new(query).with_context(|| {
        format!(
            "Set watch.query in the config file, the {} environment variable or pass --query",
            QUERY_ENV
        )
    })?;

    let period = poll_interval(args.interval_secs.unwrap_or(config.watch.interval_secs))?;
    let telegram_enabled = args.telegram || config.telegram.enabled;

    tracing::info!(
        query = %loop_config.query,
        once = args.once,
        interval_secs = period.as_secs(),
        telegram = telegram_enabled,
        state_dir = %config.general.state_dir.display(),
        "Starting careers-watch run"
    );

    // Build dependencies
    let store = Arc::new(
        JsonFileStore::open(&config.general.state_dir)
            .await
            .context("Failed to initialize state directory")?,
    );
    let source = build_listing_source(&config)?;
    let notifier: Arc<dyn Notifier> = Arc::new(build_notifier(&config, telegram_enabled).await);

    let run_loop = RunLoop::new(source, Arc::clone(&store), store, notifier, loop_config)?;

    // Execute
    if args.once {
        tracing::info!("Running single cycle");
        let outcome = run_loop.run_once().await.context("Cycle failed")?;
        match outcome {
            CycleOutcome::Unchanged { entries } => {
                tracing::info!(entries = entries, "Listing unchanged");
            }
            CycleOutcome::Changed {
                changes, notified, ..
            } => {
                tracing::info!(changes = changes.len(), notified = notified, "Listing changed");
            }
        }
    } else {
        tracing::info!(seconds = period.as_secs(), "Looping enabled");

        // Set up graceful shutdown
        let shutdown = CancellationToken::new();
        tokio::spawn({
            let shutdown = shutdown.clone();
            async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        tracing::info!("Shutdown signal received, exiting after current cycle");
                        shutdown.cancel();
                    }
                    Err(e) => tracing::error!(error = %e, "Failed to install Ctrl+C handler"),
                }
            }
        });

        run_loop.run_until_cancelled(period, shutdown).await;
    }

    tracing::info!("careers-watch run completed");
    Ok(())
}

pub(crate) fn poll_interval(secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidInterval(
            "interval must be at least one second".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

pub(crate) fn build_listing_source(config: &AppConfig) -> Result<Arc<dyn ListingSource>> {
    let source = &config.source;
    let timeout = Duration::from_secs(source.timeout_secs);

    match source.kind.trim() {
        "http" => {
            let http = HttpListingSource::new(source.base_url.clone(), timeout)
                .context("Failed to initialize HTTP listing source")?;
            Ok(Arc::new(http))
        }
        "command" => {
            if source.command.trim().is_empty() {
                bail!("source.kind is \"command\" but source.command is empty");
            }
            Ok(Arc::new(CommandListingSource::new(
                source.command.clone(),
                source.args.clone(),
                source.base_url.clone(),
                timeout,
            )))
        }
        other => bail!("Invalid source kind: {} (expected http or command)", other),
    }
}

/// Build the Telegram notifier and announce it, or a disabled one
///
/// Any setup failure only disables notifications; change detection still runs.
async fn build_notifier(config: &AppConfig, enabled: bool) -> TelegramNotifier {
    if !enabled {
        return TelegramNotifier::disabled();
    }

    tracing::info!("Initializing Telegram bot");
    match connect_telegram(config).await {
        Ok(notifier) => {
            tracing::info!("Initialized Telegram bot");
            notifier
        }
        Err(e) => {
            let error = format!("{:#}", e);
            tracing::error!(error = %error, "Failed to initialize Telegram bot");
            TelegramNotifier::disabled()
        }
    }
}

async fn connect_telegram(config: &AppConfig) -> Result<TelegramNotifier> {
    let token = load_secret(&config.telegram.token_env, "telegram token")?;
    let chat_id = load_env(&config.telegram.chat_id_env, "telegram chat id")?;

    let notifier = TelegramNotifier::with_api_base(token, chat_id, config.telegram.api_base.clone())?;
    notifier
        .notify("Bot initialized")
        .await
        .context("Failed to send greeting message")?;

    Ok(notifier)
}

pub(crate) fn load_env(env_var: &str, what: &str) -> Result<String> {
    if env_var.trim().is_empty() {
        bail!("No env var configured for {}", what);
    }

    let value = std::env::var(env_var)
        .with_context(|| format!("Missing env var {} for {}", env_var, what))?;

    if value.trim().is_empty() {
        bail!("Env var {} is empty for {}", env_var, what);
    }

    Ok(value)
}

fn load_secret(env_var: &str, what: &str) -> Result<SecretString> {
    Ok(SecretString::new(load_env(env_var, what)?.into()))
}
