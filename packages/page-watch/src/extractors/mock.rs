//! Mock extractor for testing.
//!
//! Responses are scripted per source name and consumed one per call, so a
//! test can describe what each cycle sees. When a source's script runs out
//! the last response repeats.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ExtractError, ExtractResult};
use crate::traits::Extractor;
use crate::types::record::Record;
use crate::types::source::Source;

#[derive(Debug, Clone)]
enum Scripted {
    Records(Vec<Record>),
    Fail(String),
    Hang,
}

/// Mock extractor for testing.
///
/// # Example
///
/// ```rust
/// use page_watch::extractors::MockExtractor;
/// use page_watch::Record;
///
/// let mock = MockExtractor::new()
///     .then_records("Blog", vec![Record::new("Post1", "Blog")])
///     .then_fail("News", "connection refused");
/// ```
#[derive(Default, Clone)]
pub struct MockExtractor {
    scripts: Arc<Mutex<HashMap<String, Vec<Scripted>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockExtractor {
    /// Create a mock with no scripted responses (every source yields nothing).
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, source: &str, response: Scripted) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(source.to_string())
            .or_default()
            .push(response);
        self
    }

    /// Queue a successful response for `source`.
    pub fn then_records(self, source: &str, records: Vec<Record>) -> Self {
        self.push(source, Scripted::Records(records))
    }

    /// Queue a failure for `source`.
    pub fn then_fail(self, source: &str, message: impl Into<String>) -> Self {
        self.push(source, Scripted::Fail(message.into()))
    }

    /// Queue a call that never completes (exercises extraction timeouts).
    pub fn then_hang(self, source: &str) -> Self {
        self.push(source, Scripted::Hang)
    }

    /// Source names in the order they were extracted.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn next_response(&self, source: &str) -> Scripted {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(source) {
            Some(queue) if queue.len() > 1 => queue.remove(0),
            Some(queue) => queue
                .first()
                .cloned()
                .unwrap_or(Scripted::Records(Vec::new())),
            None => Scripted::Records(Vec::new()),
        }
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(&self, source: &Source) -> ExtractResult<Vec<Record>> {
        self.calls.lock().unwrap().push(source.name.clone());

        match self.next_response(&source.name) {
            Scripted::Records(records) => Ok(records),
            Scripted::Fail(message) => Err(ExtractError::Failed(message)),
            Scripted::Hang => {
                tokio::time::sleep(Duration::from_secs(60 * 60 * 24)).await;
                Ok(Vec::new())
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str) -> Source {
        Source::new(name, "https://example.com", "li", "a")
    }

    #[tokio::test]
    async fn test_scripted_responses_in_order() {
        let mock = MockExtractor::new()
            .then_records("A", vec![Record::new("one", "A")])
            .then_fail("A", "boom")
            .then_records("A", vec![Record::new("two", "A")]);

        let first = mock.extract(&source("A")).await.unwrap();
        assert_eq!(first[0].title, "one");
        assert!(mock.extract(&source("A")).await.is_err());
        let third = mock.extract(&source("A")).await.unwrap();
        assert_eq!(third[0].title, "two");

        // Last response repeats
        let fourth = mock.extract(&source("A")).await.unwrap();
        assert_eq!(fourth[0].title, "two");
    }

    #[tokio::test]
    async fn test_unscripted_source_is_empty() {
        let mock = MockExtractor::new();
        assert!(mock.extract(&source("B")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_call_tracking() {
        let mock = MockExtractor::new();
        mock.extract(&source("A")).await.unwrap();
        mock.extract(&source("B")).await.unwrap();

        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.calls(), vec!["A".to_string(), "B".to_string()]);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let mock = MockExtractor::new();
        let clone = mock.clone();
        clone.extract(&source("A")).await.unwrap();
        assert_eq!(mock.call_count(), 1);
    }
}
