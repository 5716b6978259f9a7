//! Error types for key derivation, ciphers and compression
//!
//! A wrong password and a corrupted blob both surface as [`CryptoError::DecryptionFailed`];
//! the envelope cannot tell them apart.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CryptoError {
    /// Argon2 rejected the parameters or failed to derive the secure password
    #[error("Key derivation failed: {reason}")]
    KeyDerivationFailed { reason: String },

    #[error("Encryption failed: {reason}")]
    EncryptionFailed { reason: String },

    /// Authentication tag mismatch: wrong credentials or tampered data
    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Compression failed: {reason}")]
    CompressionFailed { reason: String },

    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Invalid credentials: {reason}")]
    InvalidCredentials { reason: String },

    /// Decrypted bytes did not decode into the expected structure
    #[error("Malformed data: {reason}")]
    MalformedData { reason: String },
}

impl CryptoError {
    /// Check if this error stems from the user's credentials.
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            CryptoError::DecryptionFailed | CryptoError::InvalidCredentials { .. }
        )
    }

    /// Check if the input was structurally invalid.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            CryptoError::MalformedData { .. } | CryptoError::InvalidKeyLength { .. }
        )
    }
}

impl From<CryptoError> for crate::Error {
    fn from(err: CryptoError) -> Self {
        crate::Error::Crypto(err)
    }
}
