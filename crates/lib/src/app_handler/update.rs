//! Single-field changes to a registered app.

use std::path::PathBuf;

use crate::{AppDetails, DirectoryInfo};

/// One change to one field of an [`AppDetails`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppUpdate {
    Rename(String),
    Reposition(PathBuf),
    Rearg(String),
    /// Replace the grant for a directory; `AccessRights::None` revokes it.
    Regrant(DirectoryInfo),
    Reicon(Vec<u8>),
    ToggleAutoStart(bool),
}

impl AppUpdate {
    pub fn apply(self, app: &mut AppDetails) {
        match self {
            AppUpdate::Rename(name) => app.name = name,
            AppUpdate::Reposition(path) => app.path = path,
            AppUpdate::Rearg(args) => app.args = args,
            AppUpdate::Regrant(dir) => app.regrant(dir),
            AppUpdate::Reicon(icon) => app.icon = icon,
            AppUpdate::ToggleAutoStart(auto_start) => app.auto_start = auto_start,
        }
    }

    /// True if the change only touches launch details kept on this machine, which the
    /// saved account does not carry.
    pub fn is_local_only(&self) -> bool {
        matches!(
            self,
            AppUpdate::Reposition(_) | AppUpdate::Rearg(_) | AppUpdate::ToggleAutoStart(_)
        )
    }
}
