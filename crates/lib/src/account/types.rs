//! Records held in the account's app registry.

use std::{borrow::Borrow, cmp::Ordering, collections::BTreeSet, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::Identity;

/// Access level of a directory grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccessRights {
    /// Revokes a grant; never stored in a permitted set.
    None,
    ReadOnly,
    ReadWrite,
}

/// A directory an application may access.
///
/// Ordered by every field, so changing the rights of a grant means removing the old
/// value and inserting a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DirectoryInfo {
    pub path: String,
    pub parent_id: Identity,
    pub directory_id: Identity,
    pub access_rights: AccessRights,
}

impl DirectoryInfo {
    pub fn new(
        path: impl Into<String>,
        parent_id: Identity,
        directory_id: Identity,
        access_rights: AccessRights,
    ) -> Self {
        Self {
            path: path.into(),
            parent_id,
            directory_id,
            access_rights,
        }
    }

    /// True if both name the same directory, whatever their rights.
    pub fn same_directory(&self, other: &DirectoryInfo) -> bool {
        self.path == other.path
            && self.parent_id == other.parent_id
            && self.directory_id == other.directory_id
    }
}

/// A registered application.
///
/// Equality and ordering use `name` only: two records with the same name are the same
/// set member even if every other field differs. A record in a `BTreeSet` can be
/// looked up by `&str`.
#[derive(Debug, Clone, Default)]
pub struct AppDetails {
    pub name: String,
    pub path: PathBuf,
    pub args: String,
    pub permitted_dirs: BTreeSet<DirectoryInfo>,
    pub icon: Vec<u8>,
    pub auto_start: bool,
}

impl AppDetails {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Applies a grant: any grant for the same directory is replaced, and
    /// [`AccessRights::None`] only removes.
    pub fn regrant(&mut self, dir: DirectoryInfo) {
        self.permitted_dirs.retain(|d| !d.same_directory(&dir));
        if dir.access_rights != AccessRights::None {
            self.permitted_dirs.insert(dir);
        }
    }
}

impl PartialEq for AppDetails {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for AppDetails {}

impl PartialOrd for AppDetails {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AppDetails {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl Borrow<str> for AppDetails {
    fn borrow(&self) -> &str {
        &self.name
    }
}
