// src/consts.rs
//! Shared constants — security parameters and defaults

/// PBKDF2 iteration count for every field token and master password hash.
/// Part of the token wire contract: tokens carry no version tag.
pub const KDF_ITERATIONS: u32 = 10_000;

/// Derived key length in bits (AES-256)
pub const KEY_LEN_BITS: u32 = 256;

/// Salt length in bytes (128 bits)
pub const SALT_LEN: usize = 16;

/// AES-GCM nonce length in bytes
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes
pub const TAG_LEN: usize = 16;

/// Separator between the salt and ciphertext components of a token
pub const TOKEN_SEPARATOR: char = ':';

/// Minimum accepted master password length at registration
pub const MIN_MASTER_PASSWORD_LEN: usize = 12;

/// Default config file, overridden by `FIELD_VAULT_CONFIG`
pub const DEFAULT_CONFIG_FILE: &str = "field-vault.toml";

/// Default database file name inside the data directory
pub const DEFAULT_DB_FILE: &str = "vault.db";

/// Route names the rate limiter is keyed on
pub const ROUTE_REGISTER: &str = "auth.register";
pub const ROUTE_CREDENTIALS_CREATE: &str = "credentials.create";
pub const ROUTE_CREDENTIALS_UPDATE: &str = "credentials.update";
pub const ROUTE_CARDS_CREATE: &str = "cards.create";
pub const ROUTE_CARDS_UPDATE: &str = "cards.update";
pub const ROUTE_ENTRIES_DELETE: &str = "entries.delete";

/// Upper bound on distinct keys tracked by the fixed-window limiter
pub const DEFAULT_RATE_LIMIT_MAX_KEYS: usize = 10_000;
