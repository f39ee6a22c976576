//! Page watch: a novelty feed over web pages.
//!
//! Polls a set of sources on a fixed interval, extracts one [`Record`] per
//! item using configured selectors, and reports only records that were not
//! seen before. Seen records are persisted so restarts do not re-report.
//!
//! # Usage
//!
//! ```rust,ignore
//! use page_watch::{ConsoleReporter, HtmlExtractor, JsonFileStore, Poller, PollerConfig, WatchConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let watch = WatchConfig::load("config.json")?;
//! let poller = Poller::new(
//!     HtmlExtractor::new()?,
//!     JsonFileStore::load("seen.json").await,
//!     ConsoleReporter::stdout(),
//!     watch.sources.clone(),
//!     PollerConfig::new(watch.interval()),
//! );
//! poller.run(CancellationToken::new()).await;
//! ```
//!
//! # Modules
//!
//! - [`types`] - Record and source types, record equality
//! - [`traits`] - Extractor, RecordStore and Reporter seams
//! - [`extractors`] - HTML and mock extractors
//! - [`storage`] - Memory and JSON file stores
//! - [`poller`] - The polling daemon
//! - [`control`] - Operator command loop

pub mod config;
pub mod control;
pub mod error;
pub mod extractors;
pub mod poller;
pub mod reporter;
pub mod storage;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use config::{AppConfig, WatchConfig};
pub use control::{run_control_loop, ControlExit};
pub use error::{ConfigError, ExtractError, StoreError};
pub use extractors::{HtmlExtractor, MockExtractor};
pub use poller::{CycleReport, Poller, PollerConfig};
pub use reporter::ConsoleReporter;
pub use storage::{JsonFileStore, MemoryStore};
pub use traits::{Extractor, RecordStore, Reporter};
pub use types::{
    record::{Field, Record},
    source::{FieldKind, FieldSpec, Source},
};
