//! JSON file state store
//!
//! Keeps the last known listing in `links.json` and the last reported diff in
//! `changes.json` inside a state directory. Every write goes to a temporary file
//! in the same directory which is then renamed over the target.

use async_trait::async_trait;
use careers_watch_domain::{ChangeLog, DiffRecord, Snapshot, SnapshotStore, StorageError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::PrettyFormatter;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const ENTRIES_FILE: &str = "links.json";
pub const CHANGES_FILE: &str = "changes.json";

/// File-backed snapshot store and change log
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
    entries_path: PathBuf,
    changes_path: PathBuf,
}

impl JsonFileStore {
    /// Use `dir` without touching the filesystem
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        Self {
            entries_path: dir.join(ENTRIES_FILE),
            changes_path: dir.join(CHANGES_FILE),
            dir,
        }
    }

    /// Create the state directory and seed both documents with `[]` if missing
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let store = Self::new(dir);

        tokio::fs::create_dir_all(&store.dir)
            .await
            .map_err(|source| StorageError::Io {
                path: store.dir.clone(),
                source,
            })?;

        for path in [&store.entries_path, &store.changes_path] {
            let exists = tokio::fs::try_exists(path)
                .await
                .map_err(|source| StorageError::Io {
                    path: path.clone(),
                    source,
                })?;
            if !exists {
                tracing::debug!(path = %path.display(), "Creating empty state file");
                write_json::<DiffRecord>(path, &[]).await?;
            }
        }

        Ok(store)
    }

    pub fn entries_path(&self) -> &Path {
        &self.entries_path
    }

    pub fn changes_path(&self) -> &Path {
        &self.changes_path
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> Result<Snapshot, StorageError> {
        read_json(&self.entries_path).await
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        write_json(&self.entries_path, snapshot).await
    }
}

#[async_trait]
impl ChangeLog for JsonFileStore {
    async fn record(&self, changes: &[DiffRecord]) -> Result<(), StorageError> {
        write_json(&self.changes_path, changes).await
    }

    async fn last(&self) -> Result<Vec<DiffRecord>, StorageError> {
        read_json(&self.changes_path).await
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

async fn write_json<T: Serialize>(path: &Path, items: &[T]) -> Result<(), StorageError> {
    let bytes = to_pretty_json(items)?;
    let target = path.to_path_buf();

    tokio::task::spawn_blocking(move || replace_file(&target, &bytes))
        .await
        .map_err(|e| StorageError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::other(e),
        })?
}

/// Four-space indentation, matching the files the tool has always written
fn to_pretty_json<T: Serialize>(items: &[T]) -> Result<Vec<u8>, StorageError> {
    let mut bytes = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    items
        .serialize(&mut serializer)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    Ok(bytes)
}

fn replace_file(target: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let io_error = |source| StorageError::Io {
        path: target.to_path_buf(),
        source,
    };

    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
    file.write_all(bytes).map_err(io_error)?;
    file.as_file().sync_all().map_err(io_error)?;
    file.persist(target).map_err(|e| io_error(e.error))?;
    Ok(())
}
