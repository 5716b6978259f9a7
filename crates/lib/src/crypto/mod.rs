//! Cryptographic primitives for the account blob and the local config file
//!
//! Provides:
//! - Argon2id derivation of a [`SecurePassword`] from [`UserCredentials`]
//! - A credential-derived obfuscation mask
//! - An AES-256-GCM envelope keyed by a [`KeyAndIv`]
//! - zlib compression for the config file

pub mod errors;

use std::io::{Read, Write};

use aes_gcm::{
    Aes256Gcm, KeyInit, Nonce,
    aead::{Aead, AeadCore, OsRng, Payload},
};
use argon2::{Algorithm, Argon2, Params, Version};
use flate2::{Compression, read::ZlibDecoder, write::ZlibEncoder};
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub use errors::CryptoError;

use crate::{
    Result, UserCredentials,
    constants::{AES256_IV_SIZE, AES256_KEY_SIZE, KEY_AND_IV_SIZE},
};

/// Nonce length for AES-GCM (12 bytes standard)
pub const NONCE_LENGTH: usize = 12;

/// AES-GCM authentication tag length
const TAG_LENGTH: usize = 16;

/// Length of the derived secure password
pub const SECURE_PASSWORD_LENGTH: usize = 64;

/// Argon2id output derived from the user's credentials.
///
/// The first [`KEY_AND_IV_SIZE`] bytes key the account blob envelope.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecurePassword([u8; SECURE_PASSWORD_LENGTH]);

impl SecurePassword {
    pub fn as_bytes(&self) -> &[u8; SECURE_PASSWORD_LENGTH] {
        &self.0
    }

    /// The key and IV used for envelopes sealed under this password.
    pub fn key_and_iv(&self) -> KeyAndIv {
        let mut key = [0u8; AES256_KEY_SIZE];
        let mut iv = [0u8; AES256_IV_SIZE];
        key.copy_from_slice(&self.0[..AES256_KEY_SIZE]);
        iv.copy_from_slice(&self.0[AES256_KEY_SIZE..KEY_AND_IV_SIZE]);
        KeyAndIv { key, iv }
    }
}

impl std::fmt::Debug for SecurePassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecurePassword(<redacted>)")
    }
}

/// Derive the secure password for a set of credentials using Argon2id.
///
/// The salt is `SHA512(keyword ++ pin)`, so the result is deterministic for the same
/// credentials and [`KdfParams`](crate::KdfParams).
pub fn derive_secure_password(credentials: &UserCredentials) -> Result<SecurePassword> {
    let kdf = credentials.kdf();
    let params = Params::new(
        kdf.m_cost,
        kdf.t_cost,
        kdf.p_cost,
        Some(SECURE_PASSWORD_LENGTH),
    )
    .map_err(|e| CryptoError::KeyDerivationFailed {
        reason: format!("Invalid Argon2 parameters: {e}"),
    })?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut salt_hasher = Sha512::new();
    salt_hasher.update(credentials.keyword().as_bytes());
    salt_hasher.update(credentials.pin().to_string().as_bytes());
    let salt = salt_hasher.finalize();

    let mut output = [0u8; SECURE_PASSWORD_LENGTH];
    argon2
        .hash_password_into(credentials.password().as_bytes(), &salt, &mut output)
        .map_err(|e| CryptoError::KeyDerivationFailed {
            reason: format!("Argon2id failed: {e}"),
        })?;

    let secure = SecurePassword(output);
    output.zeroize();
    Ok(secure)
}

/// A 32-byte AES-256 key and 16-byte IV.
///
/// The account holds one of these for the local config file; another is derived from
/// the secure password for the account blob.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyAndIv {
    key: [u8; AES256_KEY_SIZE],
    iv: [u8; AES256_IV_SIZE],
}

impl KeyAndIv {
    /// Generate fresh random key material.
    pub fn random() -> Self {
        let mut key = [0u8; AES256_KEY_SIZE];
        let mut iv = [0u8; AES256_IV_SIZE];
        OsRng.fill_bytes(&mut key);
        OsRng.fill_bytes(&mut iv);
        Self { key, iv }
    }

    /// Build from the 48-byte concatenation `key ++ iv`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_AND_IV_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_AND_IV_SIZE,
                actual: bytes.len(),
            }
            .into());
        }
        let mut key = [0u8; AES256_KEY_SIZE];
        let mut iv = [0u8; AES256_IV_SIZE];
        key.copy_from_slice(&bytes[..AES256_KEY_SIZE]);
        iv.copy_from_slice(&bytes[AES256_KEY_SIZE..]);
        Ok(Self { key, iv })
    }

    /// The 48-byte concatenation `key ++ iv`.
    pub fn to_bytes(&self) -> [u8; KEY_AND_IV_SIZE] {
        let mut out = [0u8; KEY_AND_IV_SIZE];
        out[..AES256_KEY_SIZE].copy_from_slice(&self.key);
        out[AES256_KEY_SIZE..].copy_from_slice(&self.iv);
        out
    }
}

impl std::fmt::Debug for KeyAndIv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyAndIv(<redacted>)")
    }
}

impl Serialize for KeyAndIv {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut bytes = self.to_bytes();
        let result = serializer.serialize_bytes(&bytes);
        bytes.zeroize();
        result
    }
}

impl<'de> Deserialize<'de> for KeyAndIv {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut bytes = serde_bytes::ByteBuf::deserialize(deserializer)?.into_vec();
        let parsed = KeyAndIv::from_slice(&bytes).map_err(|_| {
            serde::de::Error::invalid_length(bytes.len(), &"48 bytes of key and IV")
        });
        bytes.zeroize();
        parsed
    }
}

/// XOR `data` with a keystream derived from the credentials.
///
/// The keystream is a chain of SHA-512 blocks seeded by `password ++ pin ++ keyword`.
/// Applying the mask twice returns the input.
pub fn obfuscate(credentials: &UserCredentials, data: &[u8]) -> Vec<u8> {
    let mut seed = Sha512::new();
    seed.update(credentials.password().as_bytes());
    seed.update(credentials.pin().to_string().as_bytes());
    seed.update(credentials.keyword().as_bytes());
    let mut block = seed.finalize();

    let mut out = Vec::with_capacity(data.len());
    for chunk in data.chunks(block.len()) {
        out.extend(chunk.iter().zip(block.iter()).map(|(d, k)| d ^ k));
        block = Sha512::digest(block);
    }
    block.as_mut_slice().zeroize();
    out
}

/// Encrypt `plaintext` under the key, binding the IV as associated data.
///
/// Output layout: `nonce (12 bytes) ++ ciphertext ++ tag`.
pub fn symm_encrypt(key_and_iv: &KeyAndIv, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher =
        Aes256Gcm::new_from_slice(&key_and_iv.key).map_err(|e| CryptoError::EncryptionFailed {
            reason: format!("Failed to create cipher: {e}"),
        })?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(
            &nonce,
            Payload {
                msg: plaintext,
                aad: &key_and_iv.iv,
            },
        )
        .map_err(|e| CryptoError::EncryptionFailed {
            reason: format!("Encryption failed: {e}"),
        })?;

    let mut out = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt the output of [`symm_encrypt`].
pub fn symm_decrypt(key_and_iv: &KeyAndIv, data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < NONCE_LENGTH + TAG_LENGTH {
        return Err(CryptoError::MalformedData {
            reason: format!("envelope too short: {} bytes", data.len()),
        }
        .into());
    }
    let (nonce_bytes, ciphertext) = data.split_at(NONCE_LENGTH);

    let cipher = Aes256Gcm::new_from_slice(&key_and_iv.key).map_err(|_| {
        CryptoError::InvalidKeyLength {
            expected: AES256_KEY_SIZE,
            actual: key_and_iv.key.len(),
        }
    })?;

    cipher
        .decrypt(
            Nonce::from_slice(nonce_bytes),
            Payload {
                msg: ciphertext,
                aad: &key_and_iv.iv,
            },
        )
        .map_err(|_| CryptoError::DecryptionFailed.into())
}

/// zlib-compress at the highest level.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let compression_failed = |e: std::io::Error| CryptoError::CompressionFailed {
        reason: e.to_string(),
    };
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data).map_err(compression_failed)?;
    Ok(encoder.finish().map_err(compression_failed)?)
}

pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| CryptoError::CompressionFailed {
            reason: e.to_string(),
        })?;
    Ok(out)
}
