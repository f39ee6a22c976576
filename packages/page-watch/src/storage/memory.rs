//! In-memory record store.

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use crate::error::StoreResult;
use crate::traits::RecordStore;
use crate::types::record::Record;

/// Records keyed by source name, in first-discovery order.
pub type RecordMap = IndexMap<String, Vec<Record>>;

/// In-memory dedup store.
///
/// Useful for testing, and as the working set behind [`super::JsonFileStore`].
/// Data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<RecordMap>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `records`.
    pub fn from_map(records: RecordMap) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Copy of the whole mapping.
    pub async fn snapshot(&self) -> RecordMap {
        self.records.read().await.clone()
    }

    /// Serialize the whole mapping as pretty JSON.
    pub async fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&*self.records.read().await)
    }

    /// Total number of stored records across all sources.
    pub async fn len(&self) -> usize {
        self.records.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn contains(&self, source: &str, record: &Record) -> StoreResult<bool> {
        Ok(self
            .records
            .read()
            .await
            .get(source)
            .is_some_and(|known| record.is_known_in(known)))
    }

    async fn append(&self, source: &str, record: Record) -> StoreResult<()> {
        self.records
            .write()
            .await
            .entry(source.to_string())
            .or_default()
            .push(record);
        Ok(())
    }

    async fn records(&self, source: &str) -> StoreResult<Vec<Record>> {
        Ok(self
            .records
            .read()
            .await
            .get(source)
            .cloned()
            .unwrap_or_default())
    }

    async fn persist(&self) -> StoreResult<()> {
        Ok(())
    }
}
