// src/core/master.rs
//! Master password hash held by the account side.
//!
//! `hex(salt):hex(key)`, derived once at registration. It authenticates a
//! login and nothing else: vault tokens are always opened by re-deriving a key
//! from the salt inside each token.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::aliases::{ExposeSecret, MasterPassword, Salt};
use crate::consts::{MIN_MASTER_PASSWORD_LEN, TOKEN_SEPARATOR};
use crate::core::kdf::{derive_with, generate_salt, KdfParams};
use crate::core::util::constant_time_eq;
use crate::error::{CoreError, Result};

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MasterPasswordHash {
    salt: Salt,
    key: Vec<u8>,
}

impl MasterPasswordHash {
    /// Hash a new master password. Rejects anything under the minimum length.
    pub fn create(master: &MasterPassword) -> Result<Self> {
        check_master_password(master)?;
        let salt = generate_salt();
        let key = derive_with(master.expose_secret().as_bytes(), &salt, KdfParams::FIELD)?;
        Ok(Self {
            salt,
            key: key.to_vec(),
        })
    }

    /// Re-derive from `candidate` and compare in constant time.
    pub fn verify(&self, candidate: &MasterPassword) -> bool {
        match derive_with(
            candidate.expose_secret().as_bytes(),
            &self.salt,
            KdfParams::FIELD,
        ) {
            Ok(key) => constant_time_eq(&key, &self.key),
            Err(_) => false,
        }
    }
}

/// Registration-time policy for a new master password.
pub fn check_master_password(master: &MasterPassword) -> Result<()> {
    let value = master.expose_secret();
    if value.trim().is_empty() {
        return Err(CoreError::EmptyMasterPassword);
    }
    if value.chars().count() < MIN_MASTER_PASSWORD_LEN {
        return Err(CoreError::MasterPasswordTooShort {
            min: MIN_MASTER_PASSWORD_LEN,
        });
    }
    Ok(())
}

impl fmt::Display for MasterPasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            hex::encode(self.salt),
            TOKEN_SEPARATOR,
            hex::encode(&self.key)
        )
    }
}

impl fmt::Debug for MasterPasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterPasswordHash")
            .field("salt", &hex::encode(self.salt))
            .finish_non_exhaustive()
    }
}

impl FromStr for MasterPasswordHash {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let (salt_hex, key_hex) = s
            .split_once(TOKEN_SEPARATOR)
            .filter(|(salt, key)| !salt.is_empty() && !key.is_empty() && !key.contains(TOKEN_SEPARATOR))
            .ok_or(CoreError::MalformedToken("expected exactly one ':' separator"))?;
        let salt: Salt = hex::decode(salt_hex)
            .ok()
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(CoreError::MalformedToken("salt is not 16 hex-encoded bytes"))?;
        let key = hex::decode(key_hex)
            .map_err(|_| CoreError::MalformedToken("derived key is not valid hex"))?;
        Ok(Self { salt, key })
    }
}

impl TryFrom<String> for MasterPasswordHash {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MasterPasswordHash> for String {
    fn from(hash: MasterPasswordHash) -> Self {
        hash.to_string()
    }
}
