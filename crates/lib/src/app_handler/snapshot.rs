//! Point-in-time copies of the app registry.

use std::{
    collections::BTreeSet,
    fs::File,
    io::{self, ErrorKind},
    path::Path,
    sync::Arc,
};

use tempfile::{NamedTempFile, TempPath};

use super::config_file;
use crate::{AppDetails, Result};

/// Copy `live` to a temp file beside it, deleted when the returned path is dropped.
///
/// `None` if `live` does not exist.
pub(crate) fn copy_config_file(live: &Path) -> Result<Option<TempPath>> {
    let mut source = match File::open(live) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(config_file::io_error(live, e)),
    };
    let dir = config_file::parent_dir(live);
    let mut copy = NamedTempFile::new_in(dir).map_err(|e| config_file::io_error(dir, e))?;
    io::copy(&mut source, &mut copy).map_err(|e| config_file::io_error(live, e))?;
    Ok(Some(copy.into_temp_path()))
}

/// The app registry and config file as they were at one moment.
///
/// Clones share the config file copy; it is deleted when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub(crate) local_apps: BTreeSet<AppDetails>,
    pub(crate) non_local_apps: BTreeSet<AppDetails>,
    pub(crate) config_file: Option<Arc<TempPath>>,
}

impl Snapshot {
    pub fn local_apps(&self) -> &BTreeSet<AppDetails> {
        &self.local_apps
    }

    pub fn non_local_apps(&self) -> &BTreeSet<AppDetails> {
        &self.non_local_apps
    }

    /// Where the copied config file lives, if there was one.
    pub fn config_file_path(&self) -> Option<&Path> {
        self.config_file.as_deref().map(|copy| &**copy)
    }
}
