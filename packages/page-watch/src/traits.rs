use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::error::{ExtractResult, StoreResult};
use crate::types::record::Record;
use crate::types::source::Source;

// ============================================================================
// EXTRACTOR: Page rendering + selector matching
// ============================================================================

#[async_trait]
pub trait Extractor: Send + Sync {
    /// Render the source page and return one raw record per matched item.
    ///
    /// Items whose title comes out empty are dropped by the extractor; the
    /// poller re-checks anyway.
    async fn extract(&self, source: &Source) -> ExtractResult<Vec<Record>>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

// ============================================================================
// RECORD STORE: Already-reported records per source
// ============================================================================

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Whether a stored record for `source` matches `record`
    /// (see [`Record::matches`]).
    async fn contains(&self, source: &str, record: &Record) -> StoreResult<bool>;

    /// Append to the end of the source's sequence.
    ///
    /// Does not re-check membership; callers test with `contains` first.
    async fn append(&self, source: &str, record: Record) -> StoreResult<()>;

    /// All records for `source` in discovery order.
    async fn records(&self, source: &str) -> StoreResult<Vec<Record>>;

    /// Flush to durable storage. No-op for in-memory stores.
    async fn persist(&self) -> StoreResult<()>;
}

// ============================================================================
// REPORTER: Output sink for newly seen records
// ============================================================================

pub trait Reporter: Send + Sync {
    /// Announce a non-empty batch of new records, in discovery order.
    fn report(&self, records: &[Record], at: DateTime<Local>);
}
