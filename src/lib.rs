// src/lib.rs
//! encrypted-field-vault — client-held field encryption for a personal secrets vault
//!
//! Features:
//! - Per-field AES-256-GCM tokens, `hex(salt):base64(nonce || ciphertext)`
//! - PBKDF2-HMAC-SHA256 key per token, derived from the master password
//! - Reveal gate: fresh master password before any value is shown, copied or edited
//! - SQLite or in-memory entry storage, fixed-window rate limiting

pub mod aliases;
pub mod config;
pub mod consts;
pub mod core;
pub mod db;
pub mod enums;
pub mod gate;
pub mod generator;
#[cfg(feature = "logging")]
pub mod logging;
pub mod model;
pub mod rate_limit;
pub mod service;
pub mod strength;

pub mod error;

// Re-export everything users need at the crate root
pub use aliases::{secret, ExposeSecret, MasterPassword, PlainField, SecretString};
pub use config::{load as load_config, Config};
pub use crate::core::{decrypt_field, encrypt_field, EncryptedToken, FieldCipher, MasterPasswordHash};
pub use db::{MemoryStore, SqliteStore, VaultStore};
pub use enums::{ActionKind, CardType, Category, EntryKind, SealedField};
pub use error::{CoreError, Result as CoreResult};
pub use gate::{GateState, MemorySink, RequestOutcome, Resolution, RevealGate, RevealSink};
pub use model::{Card, Credential, EntryId, OwnerId, Record, VaultEntry};
pub use rate_limit::{FixedWindowLimiter, RateDecision, RateLimiter};
pub use service::{CardDraft, CredentialDraft, FieldUpdate, RequestContext, VaultService};
