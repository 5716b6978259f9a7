//! Error types for account creation, login and save

use thiserror::Error;

use crate::Identity;

/// Errors from the account lifecycle.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AccountError {
    /// No version pointer exists for these credentials.
    #[error("No account found at {location}")]
    NoSuchAccount { location: Identity },

    /// The handler already manages a session.
    #[error("Already logged in")]
    AlreadyLoggedIn,

    /// Save was called before create or login.
    #[error("Not logged in")]
    NotLoggedIn,

    /// The remote version pointer moved since this session last read or wrote it.
    #[error("Stale account version: expected tip {expected}, found {found}")]
    StaleVersion { expected: u64, found: u64 },

    /// The version pointer is empty, branched or otherwise unusable.
    #[error("Invalid version pointer: {reason}")]
    InvalidVersion { reason: String },
}

impl AccountError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AccountError::NoSuchAccount { .. })
    }

    pub fn is_authentication_error(&self) -> bool {
        matches!(self, AccountError::NotLoggedIn)
    }

    /// Check if a concurrent save from elsewhere won the race.
    pub fn is_stale_version(&self) -> bool {
        matches!(self, AccountError::StaleVersion { .. })
    }
}

impl From<AccountError> for crate::Error {
    fn from(err: AccountError) -> Self {
        crate::Error::Account(err)
    }
}
