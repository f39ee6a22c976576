//! JSON file backed record store.
//!
//! Keeps the working set in a [`MemoryStore`] and writes the whole mapping
//! on `persist`. The document shape is
//! `{ "<source>": [ { "title", "source", "fields": [ { "name", "value" } ] } ] }`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::memory::{MemoryStore, RecordMap};
use crate::error::{StoreError, StoreResult};
use crate::traits::RecordStore;
use crate::types::record::Record;

pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Create an empty store that will persist to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            inner: MemoryStore::new(),
        }
    }

    /// Load previously persisted state.
    ///
    /// Never fails: a missing, unreadable or malformed file yields an empty
    /// store that will overwrite it on the next persist.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let records = match tokio::fs::read_to_string(&path).await {
            Ok(data) => match serde_json::from_str::<RecordMap>(&data) {
                Ok(records) => {
                    info!(
                        path = %path.display(),
                        sources = records.len(),
                        records = records.values().map(Vec::len).sum::<usize>(),
                        "Loaded seen records"
                    );
                    records
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "State file is corrupt, starting empty");
                    RecordMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No state file yet, starting empty");
                RecordMap::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read state file, starting empty");
                RecordMap::new()
            }
        };

        Self {
            path,
            inner: MemoryStore::from_map(records),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the whole mapping.
    pub async fn snapshot(&self) -> RecordMap {
        self.inner.snapshot().await
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn contains(&self, source: &str, record: &Record) -> StoreResult<bool> {
        self.inner.contains(source, record).await
    }

    async fn append(&self, source: &str, record: Record) -> StoreResult<()> {
        self.inner.append(source, record).await
    }

    async fn records(&self, source: &str) -> StoreResult<Vec<Record>> {
        self.inner.records(source).await
    }

    /// Write to a sibling temp file, then rename over the target so a crash
    /// mid-write leaves the previous state intact.
    async fn persist(&self) -> StoreResult<()> {
        let json = self.inner.to_json().await?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.io_error(e))?;
            }
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, json.as_bytes())
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), bytes = json.len(), "Persisted seen records");
        Ok(())
    }
}
