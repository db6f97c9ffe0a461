//! careers-watch adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `listing`: HTTP and headless-browser careers listing sources
//! - `notify`: Telegram notifier
//! - `state`: JSON file state store

mod state_fs;

pub mod listing;
pub mod notify;

/// Re-exports for state adapters
pub mod state {
    pub use crate::state_fs::{CHANGES_FILE, ENTRIES_FILE, JsonFileStore};
}
