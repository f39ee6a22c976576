use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::types::source::Source;

const DEFAULT_CONFIG_PATH: &str = "config.json";
const DEFAULT_STATE_PATH: &str = "seen.json";
const DEFAULT_EXTRACT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_CONCURRENCY: usize = 1;

/// The watch document: poll interval plus the ordered list of sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchConfig {
    /// Minutes between cycles
    pub check_interval: u64,

    /// Sources in configuration order (also the polling and reporting order)
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl WatchConfig {
    pub fn new(check_interval: u64) -> Self {
        Self {
            check_interval,
            sources: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.sources.push(source);
        self
    }

    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        tracing::debug!(
            path = %path.display(),
            check_interval = config.check_interval,
            sources = config.sources.len(),
            "Loaded watch config"
        );

        Ok(config)
    }

    /// Reject configs the poller cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.check_interval == 0 {
            return Err(ConfigError::InvalidInterval(self.check_interval));
        }

        let mut seen = HashSet::new();
        for (index, source) in self.sources.iter().enumerate() {
            if source.name.is_empty() {
                return Err(ConfigError::EmptySourceName { index });
            }
            if !seen.insert(source.name.as_str()) {
                return Err(ConfigError::DuplicateSource {
                    name: source.name.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.check_interval * 60)
    }

    pub fn active_sources(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter().filter(|s| s.active)
    }
}

/// Runtime settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub config_path: PathBuf,
    pub state_path: PathBuf,
    pub extract_timeout: Duration,
    pub concurrency: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            extract_timeout: Duration::from_secs(DEFAULT_EXTRACT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl AppConfig {
    /// Load settings from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let defaults = Self::default();

        let extract_timeout = match lookup("PAGE_WATCH_EXTRACT_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_positive("PAGE_WATCH_EXTRACT_TIMEOUT_SECS", &v)?),
            None => defaults.extract_timeout,
        };
        let concurrency = match lookup("PAGE_WATCH_CONCURRENCY") {
            Some(v) => parse_positive("PAGE_WATCH_CONCURRENCY", &v)? as usize,
            None => defaults.concurrency,
        };

        Ok(Self {
            config_path: lookup("PAGE_WATCH_CONFIG")
                .map(PathBuf::from)
                .unwrap_or(defaults.config_path),
            state_path: lookup("PAGE_WATCH_STATE")
                .map(PathBuf::from)
                .unwrap_or(defaults.state_path),
            extract_timeout,
            concurrency,
        })
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = path.into();
        self
    }
}

fn parse_positive(key: &'static str, value: &str) -> ConfigResult<u64> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidSetting {
            key,
            value: value.to_string(),
        }),
    }
}
