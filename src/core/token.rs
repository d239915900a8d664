// src/core/token.rs
//! The `salt:ciphertext` token, the only persisted form of a sealed field.
//!
//! Grammar: `^[^:]+:[^:]+$`. [`EncryptedToken::parse`] enforces it for input
//! built in this process. Stored tokens load as-is and are checked by
//! [`EncryptedToken::decode`], so one damaged row surfaces as
//! `MalformedToken` when that field is opened instead of failing the whole
//! load. Decoding the hex salt and base64 ciphertext also happens there,
//! before any key is derived.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::aliases::{NonceBytes, Salt};
use crate::consts::{NONCE_LEN, TAG_LEN, TOKEN_SEPARATOR};
use crate::error::{CoreError, Result};

/// Salt + ciphertext of one sealed field. Immutable once built.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct EncryptedToken {
    raw: String,
}

/// Binary components of a token, ready for the cipher.
pub(crate) struct DecodedToken {
    pub salt: Salt,
    pub nonce: NonceBytes,
    pub sealed: Vec<u8>,
}

fn split_components(raw: &str) -> Result<(&str, &str)> {
    let mut parts = raw.split(TOKEN_SEPARATOR);
    let (salt, ciphertext) = match (parts.next(), parts.next(), parts.next()) {
        (Some(salt), Some(ciphertext), None) => (salt, ciphertext),
        _ => {
            return Err(CoreError::MalformedToken(
                "expected exactly one ':' separator",
            ))
        }
    };
    if salt.is_empty() || ciphertext.is_empty() {
        return Err(CoreError::MalformedToken("empty token component"));
    }
    Ok((salt, ciphertext))
}

impl EncryptedToken {
    /// Check `raw` against the wire grammar.
    pub fn parse(raw: &str) -> Result<Self> {
        split_components(raw)?;
        Ok(Self { raw: raw.to_owned() })
    }

    /// Assemble a token from binary parts produced by the cipher.
    pub(crate) fn from_parts(salt: &Salt, nonce: &NonceBytes, sealed: &[u8]) -> Self {
        let mut blob = Vec::with_capacity(NONCE_LEN + sealed.len());
        blob.extend_from_slice(nonce);
        blob.extend_from_slice(sealed);
        Self {
            raw: format!("{}{}{}", hex::encode(salt), TOKEN_SEPARATOR, STANDARD.encode(blob)),
        }
    }

    pub(crate) fn decode(&self) -> Result<DecodedToken> {
        let (salt_hex, ciphertext) = split_components(&self.raw)?;
        let salt_bytes = hex::decode(salt_hex)
            .map_err(|_| CoreError::MalformedToken("salt is not valid hex"))?;
        let salt: Salt = salt_bytes
            .try_into()
            .map_err(|_| CoreError::MalformedToken("salt has the wrong length"))?;

        let blob = STANDARD
            .decode(ciphertext)
            .map_err(|_| CoreError::MalformedToken("ciphertext is not valid base64"))?;
        if blob.len() < NONCE_LEN + TAG_LEN {
            return Err(CoreError::MalformedToken("ciphertext is truncated"));
        }
        let (nonce_bytes, sealed) = blob.split_at(NONCE_LEN);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);

        Ok(DecodedToken {
            salt,
            nonce,
            sealed: sealed.to_vec(),
        })
    }

    /// False for a stored token that no longer matches the grammar.
    pub fn is_intact(&self) -> bool {
        split_components(&self.raw).is_ok()
    }

    /// Hex-encoded salt component (everything before the first `:`).
    pub fn salt_hex(&self) -> &str {
        self.raw
            .split_once(TOKEN_SEPARATOR)
            .map_or(self.raw.as_str(), |(salt, _)| salt)
    }

    /// Encoded ciphertext component; empty when the separator is missing.
    pub fn ciphertext(&self) -> &str {
        self.raw
            .split_once(TOKEN_SEPARATOR)
            .map_or("", |(_, ciphertext)| ciphertext)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// True when `raw` satisfies the token grammar.
pub fn is_well_formed(raw: &str) -> bool {
    EncryptedToken::parse(raw).is_ok()
}

impl fmt::Display for EncryptedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl fmt::Debug for EncryptedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedToken")
            .field("salt", &self.salt_hex())
            .field("ciphertext_len", &self.ciphertext().len())
            .finish()
    }
}

impl FromStr for EncryptedToken {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Lenient: used when loading stored entries. Grammar is checked on decode.
impl From<String> for EncryptedToken {
    fn from(raw: String) -> Self {
        Self { raw }
    }
}

impl From<EncryptedToken> for String {
    fn from(token: EncryptedToken) -> Self {
        token.raw
    }
}
