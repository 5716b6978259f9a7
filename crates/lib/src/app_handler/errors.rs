//! Error types for the app registry

use std::path::PathBuf;

use thiserror::Error;

/// Errors from registering, linking, updating and removing apps.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AppError {
    /// No app with this name in the registry the operation looks at.
    #[error("No such app: {name}")]
    NoSuchApp { name: String },

    #[error("App already exists: {name}")]
    AppAlreadyExists { name: String },

    /// An operation ran before `initialise`.
    #[error("App handler not initialised")]
    NotInitialised,

    #[error("App handler already initialised")]
    AlreadyInitialised,

    #[error("Config file I/O error at {}: {source}", path.display())]
    ConfigFileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file decrypted but did not decode.
    #[error("Config file corrupt: {reason}")]
    ConfigFileCorrupt { reason: String },
}

impl AppError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NoSuchApp { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, AppError::AppAlreadyExists { .. })
    }

    /// Check if the call was refused to keep the registry consistent.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            AppError::NoSuchApp { .. }
                | AppError::AppAlreadyExists { .. }
                | AppError::NotInitialised
                | AppError::AlreadyInitialised
        )
    }

    pub fn is_filesystem_error(&self) -> bool {
        matches!(self, AppError::ConfigFileIo { .. })
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, AppError::ConfigFileCorrupt { .. })
    }
}

impl From<AppError> for crate::Error {
    fn from(err: AppError) -> Self {
        crate::Error::App(err)
    }
}
