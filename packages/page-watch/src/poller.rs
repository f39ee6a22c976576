//! Polling daemon.
//!
//! # Architecture
//!
//! ```text
//! Poller::run (until cancelled)
//!     │
//!     ├─► run_cycle
//!     │       ├─► Extractor.extract(source)   (active sources, config order)
//!     │       ├─► RecordStore.contains / append (new records only)
//!     │       ├─► RecordStore.persist          (batch non-empty)
//!     │       └─► Reporter.report              (batch non-empty)
//!     │
//!     └─► sleep(interval) or cancellation, whichever first
//! ```
//!
//! Extraction failures and timeouts are confined to their source; nothing
//! raised inside a cycle stops the loop.

use std::time::Duration;

use chrono::Local;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{AppConfig, WatchConfig};
use crate::error::{ExtractError, ExtractResult, StoreResult};
use crate::traits::{Extractor, RecordStore, Reporter};
use crate::types::record::Record;
use crate::types::source::Source;

/// Timing and fan-out settings, fixed for the lifetime of a poller.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Pause between the end of one cycle and the start of the next
    pub interval: Duration,
    /// Upper bound on a single extraction call
    pub extract_timeout: Duration,
    /// Extractions in flight at once; results are still consumed in order
    pub concurrency: usize,
}

impl PollerConfig {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            extract_timeout: Duration::from_secs(120),
            concurrency: 1,
        }
    }

    pub fn from_configs(watch: &WatchConfig, app: &AppConfig) -> Self {
        Self {
            interval: watch.interval(),
            extract_timeout: app.extract_timeout,
            concurrency: app.concurrency,
        }
    }

    pub fn with_extract_timeout(mut self, timeout: Duration) -> Self {
        self.extract_timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }
}

/// Outcome of one cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// Newly seen records in discovery order (source order, then page order)
    pub new_records: Vec<Record>,
    /// Active sources whose extraction failed or timed out
    pub failed_sources: Vec<String>,
    /// Inactive sources, never extracted
    pub skipped_sources: Vec<String>,
    /// Whether the store was flushed successfully this cycle
    pub persisted: bool,
    /// Whether the cycle stopped early because of cancellation
    pub cancelled: bool,
}

impl CycleReport {
    pub fn has_new_records(&self) -> bool {
        !self.new_records.is_empty()
    }
}

pub struct Poller<E, S, R> {
    extractor: E,
    store: S,
    reporter: R,
    sources: Vec<Source>,
    config: PollerConfig,
}

impl<E, S, R> Poller<E, S, R>
where
    E: Extractor,
    S: RecordStore,
    R: Reporter,
{
    pub fn new(extractor: E, store: S, reporter: R, sources: Vec<Source>, config: PollerConfig) -> Self {
        Self {
            extractor,
            store,
            reporter,
            sources,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Run cycles until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            extractor = self.extractor.name(),
            sources = self.sources.len(),
            active = self.sources.iter().filter(|s| s.active).count(),
            interval_secs = self.config.interval.as_secs(),
            "Poller starting"
        );

        let mut cycle: u64 = 0;
        loop {
            if cancel.is_cancelled() {
                break;
            }

            cycle += 1;
            let report = self.run_cycle(&cancel).await;
            info!(
                cycle,
                new_records = report.new_records.len(),
                failed_sources = report.failed_sources.len(),
                persisted = report.persisted,
                "Cycle complete"
            );

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }

        info!(cycles = cycle, "Poller stopped");
    }

    /// One pass over all sources.
    ///
    /// Cancellation is observed between sources; records accepted before it
    /// fired are still persisted and reported.
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> CycleReport {
        let mut report = CycleReport::default();

        let active: Vec<&Source> = self
            .sources
            .iter()
            .filter(|source| {
                if !source.active {
                    report.skipped_sources.push(source.name.clone());
                }
                source.active
            })
            .collect();

        let mut results = stream::iter(active)
            .map(|source| async move { (source, self.extract_source(source).await) })
            .buffered(self.config.concurrency.max(1))
            .boxed();

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    report.cancelled = true;
                    break;
                }
                next = results.next() => next,
            };

            let Some((source, result)) = next else {
                break;
            };

            match result {
                Ok(records) => {
                    if let Err(e) = self.absorb(source, records, &mut report.new_records).await {
                        error!(source = %source.name, error = %e, "Record store failed");
                        report.failed_sources.push(source.name.clone());
                    }
                }
                Err(e) => {
                    warn!(source = %source.name, error = %e, "Extraction failed");
                    report.failed_sources.push(source.name.clone());
                }
            }
        }

        if report.cancelled {
            info!(accepted = report.new_records.len(), "Cycle cancelled");
        }

        if report.has_new_records() {
            match self.store.persist().await {
                Ok(()) => report.persisted = true,
                Err(e) => error!(error = %e, "Failed to persist seen records"),
            }
            self.reporter.report(&report.new_records, Local::now());
        }

        report
    }

    async fn extract_source(&self, source: &Source) -> ExtractResult<Vec<Record>> {
        debug!(source = %source.name, url = %source.url, "Extracting source");

        match tokio::time::timeout(self.config.extract_timeout, self.extractor.extract(source)).await {
            Ok(result) => result,
            Err(_) => Err(ExtractError::Timeout {
                source_name: source.name.clone(),
            }),
        }
    }

    /// Filter one source's records through the store, appending the new ones
    /// to both the store and `batch`.
    async fn absorb(
        &self,
        source: &Source,
        records: Vec<Record>,
        batch: &mut Vec<Record>,
    ) -> StoreResult<()> {
        let extracted = records.len();
        let mut accepted = 0;

        for record in records {
            if !record.is_valid() {
                debug!(source = %source.name, "Dropping record with empty title");
                continue;
            }
            if self.store.contains(&source.name, &record).await? {
                continue;
            }

            self.store.append(&source.name, record.clone()).await?;
            batch.push(record);
            accepted += 1;
        }

        debug!(source = %source.name, extracted, accepted, "Source processed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::MockExtractor;
    use crate::storage::MemoryStore;
    use chrono::DateTime;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CollectingReporter {
        batches: Mutex<Vec<Vec<Record>>>,
    }

    impl CollectingReporter {
        fn batches(&self) -> Vec<Vec<Record>> {
            self.batches.lock().unwrap().clone()
        }
    }

    impl Reporter for CollectingReporter {
        fn report(&self, records: &[Record], _at: DateTime<Local>) {
            self.batches.lock().unwrap().push(records.to_vec());
        }
    }

    fn source(name: &str) -> Source {
        Source::new(name, format!("https://{}.example", name), ".item", "h2")
    }

    fn poller(
        extractor: MockExtractor,
        sources: Vec<Source>,
    ) -> Poller<MockExtractor, MemoryStore, CollectingReporter> {
        Poller::new(
            extractor,
            MemoryStore::new(),
            CollectingReporter::default(),
            sources,
            PollerConfig::new(Duration::from_secs(60)),
        )
    }

    #[tokio::test]
    async fn test_inactive_sources_are_not_extracted() {
        let mock = MockExtractor::new().then_records("B", vec![Record::new("b", "B")]);
        let p = poller(mock.clone(), vec![source("A").inactive(), source("B")]);

        let report = p.run_cycle(&CancellationToken::new()).await;

        assert_eq!(mock.calls(), vec!["B".to_string()]);
        assert_eq!(report.skipped_sources, vec!["A".to_string()]);
        assert!(p.store().records("A").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_titles_never_stored() {
        let mock = MockExtractor::new().then_records(
            "A",
            vec![
                Record::new("", "A").with_field("body", "unique"),
                Record::new("kept", "A"),
            ],
        );
        let p = poller(mock, vec![source("A")]);

        let report = p.run_cycle(&CancellationToken::new()).await;

        assert_eq!(report.new_records.len(), 1);
        assert_eq!(report.new_records[0].title, "kept");
        assert_eq!(p.store().len().await, 1);
    }

    #[tokio::test]
    async fn test_no_report_without_new_records() {
        let p = poller(MockExtractor::new(), vec![source("A")]);

        let report = p.run_cycle(&CancellationToken::new()).await;

        assert!(!report.has_new_records());
        assert!(!report.persisted);
        assert!(p.reporter().batches().is_empty());
    }

    #[tokio::test]
    async fn test_duplicates_within_one_extraction_collapse() {
        let record = Record::new("same", "A").with_field("body", "X");
        let mock = MockExtractor::new().then_records("A", vec![record.clone(), record]);
        let p = poller(mock, vec![source("A")]);

        let report = p.run_cycle(&CancellationToken::new()).await;
        assert_eq!(report.new_records.len(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_confined_to_source() {
        let mock = MockExtractor::new()
            .then_hang("A")
            .then_records("B", vec![Record::new("b", "B")]);
        let p = Poller::new(
            mock,
            MemoryStore::new(),
            CollectingReporter::default(),
            vec![source("A"), source("B")],
            PollerConfig::new(Duration::from_secs(60))
                .with_extract_timeout(Duration::from_millis(50)),
        );

        let report = p.run_cycle(&CancellationToken::new()).await;

        assert_eq!(report.failed_sources, vec!["A".to_string()]);
        assert_eq!(report.new_records.len(), 1);
        assert_eq!(report.new_records[0].source, "B");
    }

    #[tokio::test]
    async fn test_cancelled_before_cycle_extracts_nothing() {
        let mock = MockExtractor::new().then_records("A", vec![Record::new("a", "A")]);
        let p = poller(mock.clone(), vec![source("A")]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = p.run_cycle(&cancel).await;

        assert!(report.cancelled);
        assert_eq!(mock.call_count(), 0);
        assert!(p.reporter().batches().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_extraction_keeps_source_order() {
        let mut mock = MockExtractor::new();
        let mut sources = Vec::new();
        for name in ["A", "B", "C", "D"] {
            mock = mock.then_records(name, vec![Record::new(format!("{name}-1"), name)]);
            sources.push(source(name));
        }
        let p = Poller::new(
            mock,
            MemoryStore::new(),
            CollectingReporter::default(),
            sources,
            PollerConfig::new(Duration::from_secs(60)).with_concurrency(4),
        );

        let report = p.run_cycle(&CancellationToken::new()).await;

        let titles: Vec<_> = report.new_records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A-1", "B-1", "C-1", "D-1"]);
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let mock = MockExtractor::new().then_records("A", vec![Record::new("a", "A")]);
        let p = std::sync::Arc::new(poller(mock.clone(), vec![source("A")]));
        let cancel = CancellationToken::new();

        let handle = {
            let p = p.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { p.run(cancel).await })
        };

        // First cycle runs immediately, then the poller sleeps for a minute
        while mock.call_count() == 0 {
            tokio::task::yield_now().await;
        }
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("poller did not stop")
            .unwrap();

        assert_eq!(mock.call_count(), 1);
        assert_eq!(p.reporter().batches().len(), 1);
    }
}
