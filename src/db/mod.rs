// src/db/mod.rs
//! Entry storage: the [`VaultStore`] seam and its two backends

pub mod sqlite;
pub mod store;

pub use sqlite::SqliteStore;
pub use store::{MemoryStore, VaultStore};
