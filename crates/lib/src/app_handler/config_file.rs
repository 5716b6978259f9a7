//! The local config file
//!
//! Records the apps registered on this machine as `(name, path, args, auto_start)`.
//! Grants and icons are not stored; the account holds them. The records are encoded with
//! postcard, zlib-compressed, and encrypted with the account's config key.

use std::{
    collections::BTreeSet,
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use zeroize::Zeroizing;

use super::AppError;
use crate::{
    AppDetails, Result,
    crypto::{self, KeyAndIv},
};

#[derive(Serialize, Deserialize)]
struct ConfigRecord {
    name: String,
    path: PathBuf,
    args: String,
    auto_start: bool,
}

pub(crate) fn encode(apps: &BTreeSet<AppDetails>, key: &KeyAndIv) -> Result<Vec<u8>> {
    let records: Vec<ConfigRecord> = apps
        .iter()
        .map(|app| ConfigRecord {
            name: app.name.clone(),
            path: app.path.clone(),
            args: app.args.clone(),
            auto_start: app.auto_start,
        })
        .collect();
    let plaintext = Zeroizing::new(postcard::to_stdvec(&records)?);
    let compressed = Zeroizing::new(crypto::compress(&plaintext)?);
    crypto::symm_encrypt(key, &compressed)
}

pub(crate) fn decode(bytes: &[u8], key: &KeyAndIv) -> Result<BTreeSet<AppDetails>> {
    let compressed = Zeroizing::new(crypto::symm_decrypt(key, bytes)?);
    let plaintext = Zeroizing::new(crypto::decompress(&compressed)?);
    let records: Vec<ConfigRecord> =
        postcard::from_bytes(&plaintext).map_err(|e| AppError::ConfigFileCorrupt {
            reason: e.to_string(),
        })?;

    let mut apps = BTreeSet::new();
    for record in records {
        let name = record.name.clone();
        let app = AppDetails {
            name: record.name,
            path: record.path,
            args: record.args,
            auto_start: record.auto_start,
            ..Default::default()
        };
        if !apps.insert(app) {
            return Err(AppError::ConfigFileCorrupt {
                reason: format!("app '{name}' listed twice"),
            }
            .into());
        }
    }
    Ok(apps)
}

/// Read the config file, or an empty set if it does not exist.
pub(crate) fn read(path: &Path, key: &KeyAndIv) -> Result<BTreeSet<AppDetails>> {
    match fs::read(path) {
        Ok(bytes) => decode(&bytes, key),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeSet::new()),
        Err(e) => Err(io_error(path, e)),
    }
}

/// Encrypt `apps` and atomically replace the config file with them.
pub(crate) fn write(path: &Path, apps: &BTreeSet<AppDetails>, key: &KeyAndIv) -> Result<()> {
    write_atomic(path, &encode(apps, key)?)
}

/// Write to a temp file beside `path`, then rename it over `path`.
///
/// `path` is either unchanged or fully replaced.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = parent_dir(path);
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| io_error(dir, e))?;
    temp.write_all(bytes)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| io_error(temp.path(), e))?;
    temp.persist(path).map_err(|e| io_error(path, e.error))?;
    Ok(())
}

/// Remove the file at `path`, treating an absent file as removed.
pub(crate) fn remove(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_error(path, e)),
    }
}

/// The directory holding `path`; temp files go there so a rename stays on one filesystem.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> crate::Error {
    AppError::ConfigFileIo {
        path: path.to_path_buf(),
        source,
    }
    .into()
}
