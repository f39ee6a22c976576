//! Typed errors for the page-watch library.
//!
//! Uses `thiserror` for library errors (not `anyhow`); the binary wraps
//! them with context at the edges.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating the watch configuration.
///
/// These are the only errors that stop the daemon: it must not start
/// polling with an unknown interval or source list.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected shape
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Poll interval must be at least one minute
    #[error("checkInterval must be at least 1 minute, got {0}")]
    InvalidInterval(u64),

    /// Source has an empty name
    #[error("source #{index} has an empty name")]
    EmptySourceName { index: usize },

    /// Two sources share a name
    #[error("duplicate source name: {name}")]
    DuplicateSource { name: String },

    /// An environment setting has an unusable value
    #[error("invalid value for {key}: {value}")]
    InvalidSetting { key: &'static str, value: String },
}

/// Errors from a single extraction attempt against one source.
///
/// The poller never propagates these past the source they occurred for.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// HTTP request failed or returned a non-success status
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Invalid page URL
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// A configured selector could not be parsed
    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    /// Extraction exceeded the configured timeout
    #[error("timed out extracting {source_name}")]
    Timeout { source_name: String },

    /// Scripted failure (mock extractors)
    #[error("extraction failed: {0}")]
    Failed(String),
}

/// Errors from the dedup store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Writing the state file failed
    #[error("failed to write state {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing the state failed
    #[error("failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for config operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for extraction operations.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

