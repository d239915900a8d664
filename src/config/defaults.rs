// src/config/defaults.rs
use std::path::PathBuf;

use crate::config::app::{LoggingConfig, RateLimitConfig, StorageConfig};
use crate::consts::{DEFAULT_DB_FILE, DEFAULT_RATE_LIMIT_MAX_KEYS};
use crate::rate_limit::RoutePolicy;

pub const APP_DIR: &str = "encrypted-field-vault";
pub const DEFAULT_LOG_FILTER: &str = "encrypted_field_vault=info";

/// `<data dir>/encrypted-field-vault/vault.db`, or the working directory if
/// the platform has no data dir.
pub fn default_vault_db() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_default()
        .join(DEFAULT_DB_FILE)
}

pub fn default_storage() -> StorageConfig {
    StorageConfig {
        vault_db: default_vault_db(),
    }
}

pub fn default_rate_limit() -> RateLimitConfig {
    RateLimitConfig {
        register: RoutePolicy::new(5, 15 * 60),
        credentials_create: RoutePolicy::new(20, 60),
        cards_create: RoutePolicy::new(10, 60),
        update: RoutePolicy::new(30, 60),
        delete: RoutePolicy::new(30, 60),
        max_keys: DEFAULT_RATE_LIMIT_MAX_KEYS,
    }
}

pub fn default_logging() -> LoggingConfig {
    LoggingConfig {
        filter: DEFAULT_LOG_FILTER.into(),
    }
}
