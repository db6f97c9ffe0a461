//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::model::{DiffRecord, Snapshot};

/// Error type for listing acquisition
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
    #[error("HTTP status {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Listing structure not found: {0}")]
    Structure(String),
    #[error("Browser command failed: {0}")]
    Command(String),
    #[error("Invalid listing URL: {0}")]
    InvalidUrl(String),
}

/// Port for acquiring the current listing for a search query
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch all entries currently listed for the query, in page order
    async fn fetch(&self, query: &str) -> Result<Snapshot, FetchError>;
}

/// Error type for notification delivery
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Notifier is disabled")]
    Disabled,
}

/// Port for delivering a change report
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send the report text
    async fn notify(&self, text: &str) -> Result<(), NotifyError>;

    /// Check if this notifier is enabled
    fn is_enabled(&self) -> bool;

    /// Get the channel name (e.g., "telegram")
    fn channel(&self) -> &'static str;
}

/// Error type for persisted state
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Corrupt state in {path}: {message}")]
    Corrupt { path: PathBuf, message: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Port for the last known set of entries
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the stored snapshot; empty when nothing has been stored yet
    async fn load(&self) -> Result<Snapshot, StorageError>;

    /// Replace the stored snapshot. Readers see the old or the new one, never a mix.
    async fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError>;
}

/// Port for the most recently reported changes
#[async_trait]
pub trait ChangeLog: Send + Sync {
    /// Replace the recorded changes with this diff
    async fn record(&self, changes: &[DiffRecord]) -> Result<(), StorageError>;

    /// Get the most recently recorded diff; empty when none exists
    async fn last(&self) -> Result<Vec<DiffRecord>, StorageError>;
}
