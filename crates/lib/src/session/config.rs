//! Launcher configuration

use std::{env, ffi::OsString, path::PathBuf, sync::Arc};

use super::SessionError;
use crate::{
    Clock, Result, SystemClock,
    constants::{CONFIG_FILE_ENV, CONFIG_FILE_NAME, DEFAULT_LAUNCHER_DIR, MAX_ACCOUNT_VERSIONS},
};

/// Settings for a [`Launcher`](super::Launcher) session.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    /// Location of this machine's encrypted config file
    pub config_file_path: PathBuf,
    /// Versions kept in the account's version pointer
    pub max_versions: usize,
    /// Source of account timestamps
    pub clock: Arc<dyn Clock>,
}

impl LauncherConfig {
    pub fn new(config_file_path: impl Into<PathBuf>) -> Self {
        Self {
            config_file_path: config_file_path.into(),
            max_versions: MAX_ACCOUNT_VERSIONS,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `$SAFE_LAUNCHER_CONFIG_FILE`, or `$HOME/.safe-launcher/config` if unset.
    pub fn from_env() -> Result<Self> {
        let path = resolve_config_path(env::var_os(CONFIG_FILE_ENV), env::var_os("HOME"))?;
        Ok(Self::new(path))
    }

    pub fn with_max_versions(mut self, max_versions: usize) -> Self {
        self.max_versions = max_versions;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

fn resolve_config_path(override_path: Option<OsString>, home: Option<OsString>) -> Result<PathBuf> {
    if let Some(path) = override_path.filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    match home.filter(|h| !h.is_empty()) {
        Some(home) => Ok(PathBuf::from(home)
            .join(DEFAULT_LAUNCHER_DIR)
            .join(CONFIG_FILE_NAME)),
        None => Err(SessionError::NoConfigLocation {
            env_var: CONFIG_FILE_ENV,
        }
        .into()),
    }
}
