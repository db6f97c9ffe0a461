//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// careers-watch: watch a careers search and report added and removed job postings
#[derive(Parser, Debug)]
#[command(name = "careers-watch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Enable verbose logging (same as --log-level debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check the listing for changes, once or on an interval
    Run(RunArgs),

    /// Show the most recently recorded changes
    Changes(ChangesArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Seconds to sleep between cycles (overrides watch.interval_secs)
    #[arg(short = 's', long)]
    pub interval_secs: Option<u64>,

    /// Send a Telegram message when changes are found
    #[arg(short, long)]
    pub telegram: bool,

    /// Search query (overrides watch.query)
    #[arg(short, long)]
    pub query: Option<String>,
}

#[derive(Args, Debug)]
pub struct ChangesArgs {
    /// Output the recorded diff as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a config file with default settings and create its state directory
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,

        /// Search query to watch
        #[arg(short, long)]
        query: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
