//! Application configuration.
//!
//! Read from an optional JSON file, then overridden by `MEDSCAN_*`
//! environment variables.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Log filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "medscan_core=info,medscan_llm=info";

pub const ENV_DATABASE_PATH: &str = "MEDSCAN_DATABASE_PATH";
pub const ENV_LOG: &str = "MEDSCAN_LOG";
pub const ENV_ENHANCE_ENDPOINT: &str = "MEDSCAN_ENHANCE_ENDPOINT";
pub const ENV_ENHANCE_API_KEY: &str = "MEDSCAN_ENHANCE_API_KEY";
pub const ENV_ENHANCE_TIMEOUT_SECS: &str = "MEDSCAN_ENHANCE_TIMEOUT_SECS";
pub const ENV_ENHANCE_ENABLED: &str = "MEDSCAN_ENHANCE_ENABLED";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub log_filter: String,
    pub enhancement: EnhancementConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("medscan.db"),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            enhancement: EnhancementConfig::default(),
        }
    }
}

/// Remote enhancement endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct EnhancementConfig {
    /// When false, only the pattern extractor runs
    pub enabled: bool,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    /// No timeout when unset
    pub timeout_secs: Option<u64>,
}

impl EnhancementConfig {
    /// Enabled with somewhere to send requests.
    pub fn is_usable(&self) -> bool {
        self.enabled
            && self
                .endpoint
                .as_deref()
                .is_some_and(|e| !e.trim().is_empty())
    }
}

impl AppConfig {
    /// Load from a JSON file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Load from the file if it exists, then apply the environment.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `MEDSCAN_*` environment variables.
    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(path) = lookup(ENV_DATABASE_PATH) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(filter) = lookup(ENV_LOG) {
            self.log_filter = filter;
        }
        if let Some(endpoint) = lookup(ENV_ENHANCE_ENDPOINT) {
            self.enhancement.endpoint = Some(endpoint);
        }
        if let Some(key) = lookup(ENV_ENHANCE_API_KEY) {
            self.enhancement.api_key = Some(key);
        }
        if let Some(secs) = lookup(ENV_ENHANCE_TIMEOUT_SECS) {
            let secs = secs
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{} must be a whole number of seconds", ENV_ENHANCE_TIMEOUT_SECS))?;
            self.enhancement.timeout_secs = Some(secs);
        }
        if let Some(enabled) = lookup(ENV_ENHANCE_ENABLED) {
            self.enhancement.enabled = parse_bool(&enabled)
                .with_context(|| format!("{} must be true or false", ENV_ENHANCE_ENABLED))?;
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("unrecognized boolean {:?}", other),
    }
}
