//! Error types for the remote store

use thiserror::Error;

use super::DataName;

/// Errors returned by a [`NetworkClient`](super::NetworkClient).
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum NetworkError {
    /// A store was attempted at a name that already holds data.
    #[error("Data already exists: {name}")]
    AlreadyExists { name: DataName },

    /// Nothing is stored under the name.
    #[error("No such data: {name}")]
    NoSuchData { name: DataName },

    /// The store could not be reached. The caller may retry.
    #[error("Network unavailable: {reason}")]
    Unavailable { reason: String },
}

impl NetworkError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, NetworkError::NoSuchData { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, NetworkError::AlreadyExists { .. })
    }

    /// Check if retrying the same call could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, NetworkError::Unavailable { .. })
    }
}

impl From<NetworkError> for crate::Error {
    fn from(err: NetworkError) -> Self {
        crate::Error::Network(err)
    }
}
