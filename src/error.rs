// src/error.rs
//! Public error type for the entire crate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// Token does not satisfy the `salt:ciphertext` wire grammar.
    #[error("malformed token: {0}")]
    MalformedToken(&'static str),

    /// Decryption produced no valid plaintext. Wrong password and corrupted
    /// ciphertext are deliberately indistinguishable here.
    #[error("invalid master password")]
    WrongMasterPassword,

    #[error("encryption failed")]
    EncryptionFailure,

    #[error("invalid KDF parameters: iterations={iterations}, key_len_bits={key_len_bits}")]
    InvalidKdfParams { iterations: u32, key_len_bits: u32 },

    #[error("master password is required")]
    EmptyMasterPassword,

    #[error("master password must be at least {min} characters long")]
    MasterPasswordTooShort { min: usize },

    #[error("no reveal request is pending")]
    NoPendingRequest,

    #[error("entry not found: {0}")]
    NotFound(String),

    #[error("too many requests for {route}; retry in {retry_after_secs}s")]
    RateLimited { route: String, retry_after_secs: u64 },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("clipboard write failed: {0}")]
    Clipboard(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Message safe to show the person at the keyboard.
    ///
    /// Every cipher failure reads as a bad master password, except a token
    /// that fails the wire grammar, which is reported as corrupted data.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::MalformedToken(_) => "This entry's data is corrupted".to_string(),
            CoreError::WrongMasterPassword
            | CoreError::EncryptionFailure
            | CoreError::InvalidKdfParams { .. } => "Invalid master password".to_string(),
            CoreError::EmptyMasterPassword => "Master password is required".to_string(),
            CoreError::RateLimited { .. } => {
                "Too many requests. Please try again later.".to_string()
            }
            CoreError::Io(_) | CoreError::Sql(_) | CoreError::Config(_) | CoreError::Json(_) => {
                "Internal error".to_string()
            }
            other => other.to_string(),
        }
    }

    /// True for failures the user can fix by entering the password again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::WrongMasterPassword | CoreError::EmptyMasterPassword
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cipher_failures_share_one_user_message() {
        assert_eq!(
            CoreError::WrongMasterPassword.user_message(),
            "Invalid master password"
        );
        assert_eq!(
            CoreError::EncryptionFailure.user_message(),
            "Invalid master password"
        );
    }

    #[test]
    fn malformed_token_is_reported_as_corruption() {
        let err = CoreError::MalformedToken("expected exactly one ':' separator");
        assert_eq!(err.user_message(), "This entry's data is corrupted");
        assert!(!err.is_retryable());
    }

    #[test]
    fn wrong_password_is_retryable() {
        assert!(CoreError::WrongMasterPassword.is_retryable());
        assert!(!CoreError::NoPendingRequest.is_retryable());
    }
}
