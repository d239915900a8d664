// src/core/mod.rs
//! Pure cryptographic core, no I/O and no storage
//!
//! KDF, field cipher, token grammar and the master password hash.

pub mod cipher;
pub mod kdf;
pub mod master;
pub mod token;
pub mod util;

pub use cipher::{decrypt_field, encrypt_field, FieldCipher};
pub use kdf::{derive, generate_salt, KdfParams};
pub use master::{check_master_password, MasterPasswordHash};
pub use token::{is_well_formed, EncryptedToken};
