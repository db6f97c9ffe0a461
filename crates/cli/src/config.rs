//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Plain environment variable consulted when `watch.query` is unset
pub const QUERY_ENV: &str = "QUERY";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default)]
    pub query: Option<String>,

    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// "http" or "command"
    #[serde(default = "default_source_kind")]
    pub kind: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_browser_command")]
    pub command: String,

    #[serde(default = "default_browser_args")]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_telegram_token_env")]
    pub token_env: String,

    #[serde(default = "default_telegram_chat_id_env")]
    pub chat_id_env: String,

    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
}

// Default value functions
fn default_state_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_interval() -> u64 {
    1800
}

fn default_source_kind() -> String {
    "http".to_string()
}

fn default_base_url() -> String {
    careers_watch_adapters::listing::DEFAULT_BASE_URL.to_string()
}

fn default_source_timeout() -> u64 {
    30
}

fn default_browser_command() -> String {
    "chromium".to_string()
}

fn default_browser_args() -> Vec<String> {
    [
        "--headless",
        "--disable-dev-shm-usage",
        "--no-sandbox",
        "--dump-dom",
        "{url}",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_telegram_token_env() -> String {
    "TELEGRAM_TOKEN".to_string()
}

fn default_telegram_chat_id_env() -> String {
    "TELEGRAM_USER_ID".to_string()
}

fn default_telegram_api_base() -> String {
    careers_watch_adapters::notify::DEFAULT_API_BASE.to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            query: None,
            interval_secs: default_interval(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: default_source_kind(),
            base_url: default_base_url(),
            timeout_secs: default_source_timeout(),
            command: default_browser_command(),
            args: default_browser_args(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            token_env: default_telegram_token_env(),
            chat_id_env: default_telegram_chat_id_env(),
            api_base: default_telegram_api_base(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("CAREERS_WATCH")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let mut app: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        if app.watch.query.as_deref().is_none_or(|q| q.trim().is_empty()) {
            app.watch.query = std::env::var(QUERY_ENV)
                .ok()
                .filter(|q| !q.trim().is_empty());
        }

        Ok(app)
    }

    /// Render this configuration as a commented TOML file
    pub fn to_toml(&self) -> Result<String> {
        let body = toml::to_string_pretty(self).context("Failed to render configuration")?;
        Ok(format!("{}\n{}", FILE_HEADER, body))
    }
}

const FILE_HEADER: &str = "\
# careers-watch configuration
#
# Any key can be overridden from the environment, e.g. CAREERS_WATCH__WATCH__QUERY.
# watch.query falls back to QUERY when unset.
# source.kind is \"http\" or \"command\"; in source.args {url} becomes the results page URL.
# Telegram credentials are read from the variables named by token_env and chat_id_env.
";
