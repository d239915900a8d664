// src/core/kdf.rs
//! PBKDF2-HMAC-SHA256 key derivation from a master password.
//!
//! The iteration count and key length used for tokens are fixed in
//! [`crate::consts`]; [`KdfParams::FIELD`] is the only set the cipher uses.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::aliases::{DerivedKey, Salt};
use crate::consts::{KDF_ITERATIONS, KEY_LEN_BITS, SALT_LEN};
use crate::error::{CoreError, Result};

/// Iteration count and output length for one derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub iterations: u32,
    pub key_len_bits: u32,
}

impl KdfParams {
    /// Parameters baked into every field token and master password hash.
    pub const FIELD: KdfParams = KdfParams {
        iterations: KDF_ITERATIONS,
        key_len_bits: KEY_LEN_BITS,
    };

    fn validate(&self) -> Result<usize> {
        if self.iterations == 0 || self.key_len_bits == 0 || self.key_len_bits % 8 != 0 {
            return Err(CoreError::InvalidKdfParams {
                iterations: self.iterations,
                key_len_bits: self.key_len_bits,
            });
        }
        Ok((self.key_len_bits / 8) as usize)
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::FIELD
    }
}

/// Derive `key_len_bits / 8` bytes from `password` and `salt`.
///
/// Deterministic for identical inputs. Only fails on parameters that could
/// never produce a key (zero iterations, zero or non-byte-aligned length).
pub fn derive(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    key_len_bits: u32,
) -> Result<DerivedKey> {
    let params = KdfParams {
        iterations,
        key_len_bits,
    };
    derive_with(password, salt, params)
}

/// [`derive`] taking a [`KdfParams`] bundle.
pub fn derive_with(password: &[u8], salt: &[u8], params: KdfParams) -> Result<DerivedKey> {
    let key_len = params.validate()?;
    let mut key = Zeroizing::new(vec![0u8; key_len]);
    pbkdf2_hmac::<Sha256>(password, salt, params.iterations, key.as_mut_slice());
    Ok(key)
}

/// Fresh 128-bit salt from the thread-local CSPRNG.
pub fn generate_salt() -> Salt {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_deterministic() {
        let salt = [7u8; SALT_LEN];
        let a = derive(b"Correct-Horse-1", &salt, KDF_ITERATIONS, KEY_LEN_BITS).unwrap();
        let b = derive(b"Correct-Horse-1", &salt, KDF_ITERATIONS, KEY_LEN_BITS).unwrap();
        assert_eq!(*a, *b);
    }

    #[test]
    fn derive_output_length_follows_key_len_bits() {
        let salt = [1u8; SALT_LEN];
        assert_eq!(derive(b"pw", &salt, 1, 256).unwrap().len(), 32);
        assert_eq!(derive(b"pw", &salt, 1, 128).unwrap().len(), 16);
    }

    #[test]
    fn different_salt_gives_different_key() {
        let a = derive(b"same", &[1u8; SALT_LEN], 100, 256).unwrap();
        let b = derive(b"same", &[2u8; SALT_LEN], 100, 256).unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn different_password_gives_different_key() {
        let salt = [3u8; SALT_LEN];
        let a = derive(b"one", &salt, 100, 256).unwrap();
        let b = derive(b"two", &salt, 100, 256).unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn known_vector_pbkdf2_sha256() {
        // RFC 7914 §11 test vector: P="passwd", S="salt", c=1, dkLen=64
        let key = derive(b"passwd", b"salt", 1, 512).unwrap();
        assert_eq!(
            hex::encode(&key[..16]),
            "55ac046e56e3089fec1691c22544b605"
        );
    }

    #[test]
    fn invalid_params_are_rejected() {
        let salt = [0u8; SALT_LEN];
        assert!(matches!(
            derive(b"pw", &salt, 0, 256),
            Err(CoreError::InvalidKdfParams { iterations: 0, .. })
        ));
        assert!(matches!(
            derive(b"pw", &salt, 10, 0),
            Err(CoreError::InvalidKdfParams { .. })
        ));
        assert!(matches!(
            derive(b"pw", &salt, 10, 255),
            Err(CoreError::InvalidKdfParams { .. })
        ));
    }

    #[test]
    fn generate_salt_is_random() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
