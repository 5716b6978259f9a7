//! Network name type used for accounts, users, directories and stored data.
//!
//! An [`Identity`] is 64 opaque bytes, the size of a SHA-512 digest. Immutable data
//! is named by the hash of its content; accounts are found at a credential-derived
//! identity.

use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha512};

use crate::constants::IDENTITY_SIZE;

/// A 64-byte name on the storage network.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity([u8; IDENTITY_SIZE]);

impl Identity {
    /// Creates an identity from raw bytes.
    pub const fn from_bytes(bytes: [u8; IDENTITY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Creates a random identity.
    pub fn random() -> Self {
        let mut bytes = [0u8; IDENTITY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Names data by the SHA-512 hash of its content.
    pub fn hash_of(content: impl AsRef<[u8]>) -> Self {
        Self(Sha512::digest(content.as_ref()).into())
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; IDENTITY_SIZE] {
        &self.0
    }

    /// Returns the lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a hex-encoded identity.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        bytes.try_into().ok().map(Self)
    }
}

impl AsRef<[u8]> for Identity {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Identity {
    type Error = std::array::TryFromSliceError;

    fn try_from(bytes: &[u8]) -> std::result::Result<Self, Self::Error> {
        Ok(Self(bytes.try_into()?))
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// Logs get the first few bytes only.
impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Identity({}..)", hex::encode(&self.0[..6]))
    }
}

// Serialized as a byte string, not as a 64-element tuple.
impl Serialize for Identity {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes = serde_bytes::ByteBuf::deserialize(deserializer)?;
        Identity::try_from(bytes.as_slice()).map_err(|_| {
            serde::de::Error::invalid_length(bytes.len(), &"64 bytes for an Identity")
        })
    }
}
