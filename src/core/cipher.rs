// src/core/cipher.rs
//! Field-level encryption: one plaintext in, one `salt:ciphertext` token out
//!
//! Every call derives its own key from a fresh salt, so no key material
//! outlives the call and no two tokens share a key.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use tracing::{debug, trace};

use crate::aliases::{secret, ExposeSecret, MasterPassword, NonceBytes, PlainField};
use crate::consts::NONCE_LEN;
use crate::core::kdf::{derive_with, generate_salt, KdfParams};
use crate::core::token::EncryptedToken;
use crate::error::{CoreError, Result};

/// Seals and opens individual vault fields under a master password.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldCipher {
    params: KdfParams,
}

impl FieldCipher {
    pub fn new() -> Self {
        Self {
            params: KdfParams::FIELD,
        }
    }

    /// Encrypt `plaintext` into a new token with a fresh salt and nonce.
    pub fn encrypt(&self, plaintext: &str, master: &MasterPassword) -> Result<EncryptedToken> {
        let salt = generate_salt();
        let key = derive_with(master.expose_secret().as_bytes(), &salt, self.params)
            .map_err(|_| CoreError::EncryptionFailure)?;
        let cipher =
            Aes256Gcm::new_from_slice(&key).map_err(|_| CoreError::EncryptionFailure)?;

        let mut nonce: NonceBytes = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce);

        let sealed = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| CoreError::EncryptionFailure)?;

        trace!(salt = %hex::encode(salt), "sealed field");
        Ok(EncryptedToken::from_parts(&salt, &nonce, &sealed))
    }

    /// Parse `raw` against the token grammar, then [`Self::decrypt_token`].
    pub fn decrypt(&self, raw: &str, master: &MasterPassword) -> Result<PlainField> {
        let token = EncryptedToken::parse(raw)?;
        self.decrypt_token(&token, master)
    }

    /// Recover the plaintext of `token`.
    ///
    /// Authentication failure is the only wrong-password signal: any tag
    /// mismatch or non-UTF-8 output maps to [`CoreError::WrongMasterPassword`].
    pub fn decrypt_token(&self, token: &EncryptedToken, master: &MasterPassword) -> Result<PlainField> {
        let decoded = token.decode()?;
        let key = derive_with(master.expose_secret().as_bytes(), &decoded.salt, self.params)?;
        let cipher =
            Aes256Gcm::new_from_slice(&key).map_err(|_| CoreError::WrongMasterPassword)?;

        let plaintext = cipher
            .decrypt(Nonce::from_slice(&decoded.nonce), decoded.sealed.as_slice())
            .map_err(|_| {
                debug!(salt = token.salt_hex(), "field authentication failed");
                CoreError::WrongMasterPassword
            })?;

        let text = String::from_utf8(plaintext).map_err(|_| CoreError::WrongMasterPassword)?;
        Ok(secret(text))
    }
}

/// Encrypt with the default [`FieldCipher`].
pub fn encrypt_field(plaintext: &str, master: &MasterPassword) -> Result<EncryptedToken> {
    FieldCipher::new().encrypt(plaintext, master)
}

/// Decrypt with the default [`FieldCipher`].
pub fn decrypt_field(raw: &str, master: &MasterPassword) -> Result<PlainField> {
    FieldCipher::new().decrypt(raw, master)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aliases::secret;

    #[test]
    fn roundtrip_example_scenario() {
        let master = secret("Correct-Horse-1");
        let token = encrypt_field("hunter2", &master).unwrap();

        let plain = decrypt_field(&token.to_string(), &master).unwrap();
        assert_eq!(plain.expose_secret(), "hunter2");

        let wrong = decrypt_field(&token.to_string(), &secret("wrong-pw"));
        assert!(matches!(wrong, Err(CoreError::WrongMasterPassword)));

        let malformed = decrypt_field("deadbeef", &secret("anything"));
        assert!(matches!(malformed, Err(CoreError::MalformedToken(_))));
    }

    #[test]
    fn same_input_twice_gives_unrelated_tokens() {
        let master = secret("Correct-Horse-1");
        let a = encrypt_field("same", &master).unwrap();
        let b = encrypt_field("same", &master).unwrap();
        assert_ne!(a.salt_hex(), b.salt_hex());
        assert_ne!(a.ciphertext(), b.ciphertext());
    }

    #[test]
    fn empty_plaintext_roundtrips() {
        let master = secret("Correct-Horse-1");
        let token = encrypt_field("", &master).unwrap();
        let plain = decrypt_field(&token.to_string(), &master).unwrap();
        assert_eq!(plain.expose_secret(), "");
    }

    #[test]
    fn unicode_plaintext_roundtrips() {
        let master = secret("pässwörd-ümlaut");
        let token = encrypt_field("ключ 🔑", &master).unwrap();
        let plain = decrypt_field(&token.to_string(), &master).unwrap();
        assert_eq!(plain.expose_secret(), "ключ 🔑");
    }

    #[test]
    fn decrypt_is_idempotent() {
        let master = secret("Correct-Horse-1");
        let token = encrypt_field("4111111111111111", &master).unwrap();
        let first = decrypt_field(&token.to_string(), &master).unwrap();
        let second = decrypt_field(&token.to_string(), &master).unwrap();
        assert_eq!(first.expose_secret(), second.expose_secret());
    }

    #[test]
    fn token_matches_wire_grammar() {
        let token = encrypt_field("x", &secret("m")).unwrap().to_string();
        assert_eq!(token.matches(':').count(), 1);
        let (salt, ct) = token.split_once(':').unwrap();
        assert_eq!(salt.len(), 32);
        assert!(salt.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!ct.is_empty());
    }

    #[test]
    fn flipped_ciphertext_bit_reads_as_wrong_password() {
        let master = secret("Correct-Horse-1");
        let token = encrypt_field("secret", &master).unwrap();
        let decoded = token.decode().unwrap();
        let mut sealed = decoded.sealed.clone();
        sealed[0] ^= 0x01;
        let tampered = EncryptedToken::from_parts(&decoded.salt, &decoded.nonce, &sealed);

        let result = decrypt_field(&tampered.to_string(), &master);
        assert!(matches!(result, Err(CoreError::WrongMasterPassword)));
    }
}
