// src/config/app.rs
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use super::defaults::*;
use crate::consts::DEFAULT_CONFIG_FILE;
use crate::error::Result;
use crate::rate_limit::RoutePolicy;

/// Env var naming the config file.
pub const CONFIG_ENV: &str = "FIELD_VAULT_CONFIG";
/// Env var overriding `[storage] vault_db`.
pub const DB_ENV: &str = "FIELD_VAULT_DB";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default = "default_storage")]
    pub storage: StorageConfig,
    #[serde(default = "default_rate_limit")]
    pub rate_limit: RateLimitConfig,
    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_vault_db")]
    pub vault_db: PathBuf,
}

/// Per-route policies. A missing route keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub register: RoutePolicy,
    pub credentials_create: RoutePolicy,
    pub cards_create: RoutePolicy,
    pub update: RoutePolicy,
    pub delete: RoutePolicy,
    pub max_keys: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        default_rate_limit()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.into()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage: default_storage(),
            rate_limit: default_rate_limit(),
            logging: default_logging(),
        }
    }
}

/// Load from `$FIELD_VAULT_CONFIG` (or `field-vault.toml`), then apply env overrides.
///
/// A missing file falls back to built-in defaults; an unreadable or invalid
/// one is an error.
pub fn load() -> Result<Config> {
    let config_path =
        std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

    let mut conf = if Path::new(&config_path).exists() {
        load_from(&config_path)?
    } else {
        warn!(path = %config_path, "config file not found, using built-in defaults");
        Config::default()
    };

    if let Ok(db) = std::env::var(DB_ENV) {
        conf.storage.vault_db = PathBuf::from(db);
    }

    Ok(conf)
}

/// Parse one TOML file. No env overrides.
pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let conf = toml::from_str(&content)?;
    info!(path = %path.as_ref().display(), "config loaded");
    Ok(conf)
}
