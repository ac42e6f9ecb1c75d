//! Runtime configuration for the tagging service.
//!
//! Values come from the command line (with environment fallbacks, see
//! `main.rs`); every struct has a `Default` matching [`crate::consts`] so
//! tests can build one without touching the environment.

use anyhow::{Result, bail};
use std::time::Duration;

use crate::consts::{
    DEFAULT_API_BASE, DEFAULT_BIND, DEFAULT_MAX_TAGS, DEFAULT_MODEL,
    DEFAULT_PROVIDER_TIMEOUT_MS, DEFAULT_TEMPERATURE,
};

/// Where the aggregate counters live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AggregateBackend {
    /// Process-local; reset on restart.
    Memory,
    /// Counters persisted in the service database.
    Sqlite,
}

/// Tagging policy shared by both strategies.
#[derive(Debug, Clone)]
pub struct TaggerConfig {
    /// K: the most tags a single review may carry.
    pub max_tags: usize,
    /// Bound on one capability call before falling back.
    pub provider_timeout: Duration,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            max_tags: DEFAULT_MAX_TAGS,
            provider_timeout: Duration::from_millis(DEFAULT_PROVIDER_TIMEOUT_MS),
        }
    }
}

/// External classification provider settings.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl ProviderConfig {
    /// The credential, if one is set and non-blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Everything the `serve` command needs.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind: String,
    /// SQLite path, or `:memory:` for an ephemeral store.
    pub db_path: String,
    pub aggregate: AggregateBackend,
    pub tagger: TaggerConfig,
    pub provider: ProviderConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            db_path: ":memory:".to_string(),
            aggregate: AggregateBackend::Memory,
            tagger: TaggerConfig::default(),
            provider: ProviderConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tagger.max_tags == 0 {
            bail!("max tags must be at least 1");
        }
        if self.tagger.provider_timeout.is_zero() {
            bail!("provider timeout must be greater than zero");
        }
        if self.bind.trim().is_empty() {
            bail!("bind address is empty");
        }
        if self.db_path.trim().is_empty() {
            bail!("database path is empty");
        }
        Ok(())
    }
}
