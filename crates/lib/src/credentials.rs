//! User credentials
//!
//! The keyword and PIN locate the account on the network; the password (together with
//! both of them) derives the keys that encrypt it. Credentials are wiped from memory on
//! drop.

use sha2::{Digest, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{Identity, Result, crypto::CryptoError};

/// Argon2id cost parameters for secure-password derivation.
///
/// The same parameters must be used to create, log in to, and save an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub m_cost: u32,
    /// Number of iterations
    pub t_cost: u32,
    /// Degree of parallelism
    pub p_cost: u32,
}

impl KdfParams {
    pub const fn new(m_cost: u32, t_cost: u32, p_cost: u32) -> Self {
        Self {
            m_cost,
            t_cost,
            p_cost,
        }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::new(
            argon2::Params::DEFAULT_M_COST,
            argon2::Params::DEFAULT_T_COST,
            argon2::Params::DEFAULT_P_COST,
        )
    }
}

/// The secrets a user logs in with.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct UserCredentials {
    keyword: String,
    pin: u32,
    password: String,
    #[zeroize(skip)]
    kdf: KdfParams,
}

impl UserCredentials {
    /// Create credentials with the default key-derivation costs.
    ///
    /// Fails with [`CryptoError::InvalidCredentials`] if the keyword or password is empty.
    pub fn new(keyword: impl Into<String>, pin: u32, password: impl Into<String>) -> Result<Self> {
        let keyword = keyword.into();
        let password = password.into();
        if keyword.is_empty() {
            return Err(CryptoError::InvalidCredentials {
                reason: "keyword must not be empty".to_string(),
            }
            .into());
        }
        if password.is_empty() {
            return Err(CryptoError::InvalidCredentials {
                reason: "password must not be empty".to_string(),
            }
            .into());
        }
        Ok(Self {
            keyword,
            pin,
            password,
            kdf: KdfParams::default(),
        })
    }

    /// Replace the key-derivation costs.
    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn pin(&self) -> u32 {
        self.pin
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn kdf(&self) -> KdfParams {
        self.kdf
    }

    /// The network name of this user's version pointer:
    /// `SHA512(SHA512(keyword) ++ SHA512(pin))`, with the PIN in decimal.
    pub fn account_location(&self) -> Identity {
        let mut hasher = Sha512::new();
        hasher.update(Sha512::digest(self.keyword.as_bytes()));
        hasher.update(Sha512::digest(self.pin.to_string().as_bytes()));
        Identity::from_bytes(hasher.finalize().into())
    }
}

impl std::fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCredentials")
            .field("keyword", &"<redacted>")
            .field("pin", &"<redacted>")
            .field("password", &"<redacted>")
            .field("kdf", &self.kdf)
            .finish()
    }
}
