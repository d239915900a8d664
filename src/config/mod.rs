// src/config/mod.rs
//! Configuration system for encrypted-field-vault
//!
//! TOML file + env overrides, loaded explicitly by the caller.

pub use app::{
    load, load_from, Config, LoggingConfig, RateLimitConfig, StorageConfig, CONFIG_ENV, DB_ENV,
};
pub use defaults::default_vault_db;

mod app;
mod defaults;
