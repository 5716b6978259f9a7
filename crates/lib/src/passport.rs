//! Identity material held by an account
//!
//! A [`Passport`] owns the user's ed25519 signing key. It travels inside the account
//! blob sealed under the credential-derived secure password, so the blob's outer
//! envelope and the key inside it are protected independently.

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use zeroize::{ZeroizeOnDrop, Zeroizing};

use crate::{
    Result,
    crypto::{self, CryptoError, SecurePassword},
};

/// Size of Ed25519 private keys in bytes
pub const ED25519_PRIVATE_KEY_SIZE: usize = 32;

/// The user's identity keys. Exclusively owned; deliberately not `Clone`.
pub struct Passport {
    signing_key: SigningKey,
}

/// Zeroization is handled by `SigningKey::Drop` (the `zeroize` feature of ed25519-dalek).
impl ZeroizeOnDrop for Passport {}

impl Passport {
    /// Generate fresh identity keys.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn public_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Seal the signing key under the secure password.
    pub fn encrypt(&self, secure_password: &SecurePassword) -> Result<Vec<u8>> {
        let key_bytes = Zeroizing::new(self.signing_key.to_bytes());
        crypto::symm_encrypt(&secure_password.key_and_iv(), key_bytes.as_ref())
    }

    /// Open a signing key sealed by [`Passport::encrypt`].
    pub fn decrypt(sealed: &[u8], secure_password: &SecurePassword) -> Result<Self> {
        let plaintext = Zeroizing::new(crypto::symm_decrypt(
            &secure_password.key_and_iv(),
            sealed,
        )?);
        let key_array: Zeroizing<[u8; ED25519_PRIVATE_KEY_SIZE]> = Zeroizing::new(
            plaintext
                .as_slice()
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: ED25519_PRIVATE_KEY_SIZE,
                    actual: plaintext.len(),
                })?,
        );
        Ok(Self {
            signing_key: SigningKey::from_bytes(&key_array),
        })
    }
}

impl std::fmt::Debug for Passport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Passport")
            .field("public_key", &hex::encode(self.public_key().as_bytes()))
            .finish()
    }
}
