//!
//! safe-launcher: an encrypted user account and application registry kept on a
//! content-addressed storage network.
//!
//! ## Core Concepts
//!
//! * **Account (`account::Account`)**: The user's root record. Holds identity material, the set of
//!   registered applications, and the key material used to encrypt the local config file.
//! * **Account codec (`account::encrypt_account`)**: Turns an `Account` into an opaque,
//!   credential-encrypted blob and back.
//! * **AccountHandler (`account_handler::AccountHandler`)**: Creates, logs in to, and saves the
//!   encrypted account against a `network::NetworkClient`, chaining versions through a
//!   single-branch `account_handler::VersionChain`.
//! * **AppHandler (`app_handler::AppHandler`)**: Reconciles apps registered on this machine (the
//!   encrypted local config file) with the apps held in the account, and provides snapshots for
//!   all-or-nothing rollback.
//! * **Launcher (`session::Launcher`)**: The session controller. Owns the `Account` behind a mutex
//!   and sequences every public operation as snapshot, mutate, commit-or-revert.

pub mod account;
pub mod account_handler;
pub mod app_handler;
pub mod clock;
pub mod constants;
pub mod credentials;
pub mod crypto;
pub mod identity;
pub mod network;
pub mod passport;
pub mod session;

pub use account::{AccessRights, Account, AppDetails, DirectoryInfo};
pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use credentials::{KdfParams, UserCredentials};
pub use identity::Identity;
pub use session::{Launcher, LauncherConfig};

/// Result type used throughout the launcher library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the launcher library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] postcard::Error),

    /// Structured key derivation, cipher and compression errors
    #[error(transparent)]
    Crypto(crypto::CryptoError),

    /// Structured remote store errors
    #[error(transparent)]
    Network(network::NetworkError),

    /// Structured account lifecycle errors
    #[error(transparent)]
    Account(account_handler::AccountError),

    /// Structured app registry errors
    #[error(transparent)]
    App(app_handler::AppError),

    /// Structured session controller errors
    #[error(transparent)]
    Session(session::SessionError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Crypto(_) => "crypto",
            Error::Network(_) => "network",
            Error::Account(_) => "account_handler",
            Error::App(_) => "app_handler",
            Error::Session(_) => "session",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Network(network_err) => network_err.is_not_found(),
            Error::Account(account_err) => account_err.is_not_found(),
            Error::App(app_err) => app_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_already_exists(&self) -> bool {
        match self {
            Error::Network(network_err) => network_err.is_already_exists(),
            Error::App(app_err) => app_err.is_already_exists(),
            _ => false,
        }
    }

    /// Check if this error is a cryptographic failure.
    ///
    /// Wrong credentials and corrupted data are indistinguishable and both land here.
    pub fn is_crypto_error(&self) -> bool {
        matches!(self, Error::Crypto(_))
    }

    /// Check if this error is authentication-related.
    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::Crypto(crypto_err) => crypto_err.is_authentication_error(),
            Error::Account(account_err) => account_err.is_authentication_error(),
            _ => false,
        }
    }

    /// Check if this error came from the remote store.
    pub fn is_network_error(&self) -> bool {
        matches!(self, Error::Network(_))
    }

    /// Check if this error is one the caller may retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Network(network_err) => network_err.is_transient(),
            Error::Account(account_err) => account_err.is_stale_version(),
            _ => false,
        }
    }

    /// Check if this error is a violation of the app registry invariants.
    pub fn is_invariant_violation(&self) -> bool {
        match self {
            Error::App(app_err) => app_err.is_invariant_violation(),
            _ => false,
        }
    }

    /// Check if this error is related to the local filesystem.
    pub fn is_filesystem_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::App(app_err) => app_err.is_filesystem_error(),
            Error::Session(session_err) => session_err.is_filesystem_error(),
            _ => false,
        }
    }

    /// Check if this error is a serialization failure.
    pub fn is_serialization_error(&self) -> bool {
        match self {
            Error::Serialize(_) => true,
            Error::Crypto(crypto_err) => crypto_err.is_malformed(),
            Error::App(app_err) => app_err.is_corrupt(),
            _ => false,
        }
    }
}
