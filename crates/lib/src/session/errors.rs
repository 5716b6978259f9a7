//! Error types for the session controller

use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SessionError {
    /// An operation failed and restoring the pre-operation snapshot failed too.
    ///
    /// The registry or config file may no longer match the account.
    #[error("Revert failed: {reason}")]
    RevertFailed { reason: String },

    /// Neither the config file override nor a home directory is set.
    #[error("Cannot locate the config file: set {env_var} or HOME")]
    NoConfigLocation { env_var: &'static str },

    /// The account lacks an id the operation needs.
    #[error("Account has no {missing}")]
    IncompleteAccount { missing: &'static str },
}

impl SessionError {
    pub fn is_filesystem_error(&self) -> bool {
        matches!(
            self,
            SessionError::RevertFailed { .. } | SessionError::NoConfigLocation { .. }
        )
    }
}

impl From<SessionError> for crate::Error {
    fn from(err: SessionError) -> Self {
        crate::Error::Session(err)
    }
}
