//! Run loop use case - orchestrates fetching, diffing, notifying and persisting

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    model::{CycleOutcome, DiffRecord, Snapshot},
    ports::{ChangeLog, FetchError, ListingSource, Notifier, SnapshotStore, StorageError},
    usecases::{diff::diff, report::format_report},
};

/// Configuration for the run loop
#[derive(Debug, Clone)]
pub struct RunLoopConfig {
    /// Search query passed to the listing source
    pub query: String,
}

impl RunLoopConfig {
    pub fn new(query: impl Into<String>) -> Result<Self, ConfigError> {
        let config = Self {
            query: query.into(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.query.trim().is_empty() {
            return Err(ConfigError::MissingQuery);
        }
        Ok(())
    }
}

/// Run loop orchestrator
///
/// Owns the cycle: fetch, load, diff, report, save. Each cycle is sequential and
/// the loop never runs two at once.
pub struct RunLoop<L, S, C, N>
where
    L: ListingSource + ?Sized,
    S: SnapshotStore + ?Sized,
    C: ChangeLog + ?Sized,
    N: Notifier + ?Sized,
{
    source: Arc<L>,
    snapshots: Arc<S>,
    change_log: Arc<C>,
    notifier: Arc<N>,
    config: RunLoopConfig,
}

impl<L, S, C, N> RunLoop<L, S, C, N>
where
    L: ListingSource + ?Sized,
    S: SnapshotStore + ?Sized,
    C: ChangeLog + ?Sized,
    N: Notifier + ?Sized,
{
    pub fn new(
        source: Arc<L>,
        snapshots: Arc<S>,
        change_log: Arc<C>,
        notifier: Arc<N>,
        config: RunLoopConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            source,
            snapshots,
            change_log,
            notifier,
            config,
        })
    }

    /// Run a single watch cycle
    pub async fn run_once(&self) -> Result<CycleOutcome, CycleError> {
        let query = self.config.query.as_str();
        tracing::info!(query = %query, "Fetching listing");

        let current = self.source.fetch(query).await?;

        tracing::info!(count = current.len(), "Fetched entries");
        for entry in &current {
            tracing::debug!(name = %entry.name, link = %entry.link, "Found entry");
        }

        let previous = self.snapshots.load().await?;
        tracing::debug!(count = previous.len(), "Loaded previous snapshot");

        let changes = diff(&previous, &current);

        if changes.is_empty() {
            tracing::info!("No changes found");
            self.save_snapshot(&current).await?;
            return Ok(CycleOutcome::Unchanged {
                entries: current.len(),
            });
        }

        let (outcome, audit_error) = self.report_changes(changes).await;
        self.save_snapshot(&current).await?;

        match audit_error {
            Some(e) => Err(CycleError::Storage(e)),
            None => Ok(outcome),
        }
    }

    async fn save_snapshot(&self, current: &Snapshot) -> Result<(), StorageError> {
        self.snapshots.save(current).await?;
        tracing::info!(count = current.len(), "Saved snapshot");
        Ok(())
    }

    /// Log, record and deliver a non-empty diff
    ///
    /// A change-log failure is handed back so the snapshot can still be saved first.
    async fn report_changes(
        &self,
        changes: Vec<DiffRecord>,
    ) -> (CycleOutcome, Option<StorageError>) {
        for record in &changes {
            tracing::info!(
                action = ?record.action,
                name = %record.entry.name,
                link = %record.entry.link,
                "Listing changed"
            );
        }

        let report = format_report(&changes);
        tracing::info!("{}", report);

        let audit_error = match self.change_log.record(&changes).await {
            Ok(()) => {
                tracing::info!(count = changes.len(), "Saved changes");
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to save changes");
                Some(e)
            }
        };

        let mut notified = false;
        if self.notifier.is_enabled() {
            let channel = self.notifier.channel();
            tracing::debug!(channel = channel, "Sending notification");
            match self.notifier.notify(&report).await {
                Ok(()) => {
                    tracing::info!(channel = channel, "Sent notification");
                    notified = true;
                }
                Err(e) => {
                    tracing::error!(channel = channel, error = %e, "Failed to send notification");
                }
            }
        }

        let outcome = CycleOutcome::Changed {
            changes,
            report,
            notified,
        };
        (outcome, audit_error)
    }

    /// Run cycles until `shutdown` is cancelled, waiting `period` after each one
    ///
    /// The first cycle starts immediately. Cancellation is observed between
    /// cycles only; a cycle in progress always completes.
    pub async fn run_until_cancelled(&self, period: Duration, shutdown: CancellationToken) {
        while !shutdown.is_cancelled() {
            match self.run_once().await {
                Ok(outcome) => {
                    tracing::info!(changes = outcome.changes().len(), "Cycle complete");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Cycle failed");
                }
            }

            tracing::info!(seconds = period.as_secs(), "Sleeping until next cycle");
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = sleep(period) => {}
            }
        }

        tracing::info!("Shutting down gracefully");
    }
}

/// Errors from configuring the run loop
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No search query configured")]
    MissingQuery,
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),
}

/// Errors that end a watch cycle
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
