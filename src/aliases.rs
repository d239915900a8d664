// src/aliases.rs
//! Secret-holding types used throughout encrypted-field-vault
//!
//! Everything that carries a master password, a derived key or a recovered
//! plaintext goes through one of these so it is zeroized on drop and never
//! shows up in `Debug` output.

pub use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::consts::{NONCE_LEN, SALT_LEN};

/// User-supplied master password. Re-entered per sensitive action, never stored.
pub type MasterPassword = SecretString;

/// Recovered plaintext of a single sealed field.
pub type PlainField = SecretString;

/// Key material produced by the KDF, zeroized on drop
pub type DerivedKey = Zeroizing<Vec<u8>>;

/// 128-bit KDF salt carried inside every token
pub type Salt = [u8; SALT_LEN];

/// 96-bit AES-GCM nonce
pub type NonceBytes = [u8; NONCE_LEN];

/// Wrap an owned string as a secret in one call.
#[inline]
pub fn secret(value: impl Into<String>) -> SecretString {
    SecretString::from(value.into())
}
