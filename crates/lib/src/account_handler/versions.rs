//! The account's version pointer
//!
//! A single-branch chain of `(index, blob id)` pairs stored at the credential-derived
//! location. The last entry is the tip: the blob a login decrypts.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::AccountError;
use crate::{Identity, Result};

/// One saved version of the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionName {
    pub index: u64,
    /// Content address of the encrypted account blob
    pub id: Identity,
}

/// Append-only, single-branch list of account versions, capped at `max_versions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChain {
    max_versions: usize,
    /// Oldest first
    versions: VecDeque<VersionName>,
}

impl VersionChain {
    /// An empty chain. A cap of zero is treated as one.
    pub fn new(max_versions: usize) -> Self {
        Self {
            max_versions: max_versions.max(1),
            versions: VecDeque::new(),
        }
    }

    pub fn tip(&self) -> Option<&VersionName> {
        self.versions.back()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VersionName> {
        self.versions.iter()
    }

    /// Append `new` on top of `old`, which must be the current tip.
    ///
    /// The first version must have index 0; each later one must follow the tip's index
    /// by exactly one. The oldest versions are dropped beyond the cap.
    pub fn put(&mut self, old: Option<&VersionName>, new: VersionName) -> Result<()> {
        if old != self.tip() {
            return Err(AccountError::InvalidVersion {
                reason: format!(
                    "cannot branch: predecessor {:?} is not the tip {:?}",
                    old.map(|v| v.index),
                    self.tip().map(|v| v.index)
                ),
            }
            .into());
        }
        let expected = self.tip().map_or(0, |tip| tip.index + 1);
        if new.index != expected {
            return Err(AccountError::InvalidVersion {
                reason: format!("expected index {expected}, got {}", new.index),
            }
            .into());
        }
        self.versions.push_back(new);
        while self.versions.len() > self.max_versions {
            self.versions.pop_front();
        }
        Ok(())
    }

    pub fn serialise(&self) -> Result<Vec<u8>> {
        Ok(postcard::to_stdvec(&self.versions)?)
    }

    /// Parse a stored chain, checking it is non-empty and consecutive.
    pub fn parse(bytes: &[u8], max_versions: usize) -> Result<Self> {
        let versions: VecDeque<VersionName> =
            postcard::from_bytes(bytes).map_err(|e| AccountError::InvalidVersion {
                reason: format!("undecodable version pointer: {e}"),
            })?;
        if versions.is_empty() {
            return Err(AccountError::InvalidVersion {
                reason: "version pointer has no versions".to_string(),
            }
            .into());
        }
        let consecutive = versions
            .iter()
            .zip(versions.iter().skip(1))
            .all(|(a, b)| b.index == a.index + 1);
        if !consecutive {
            return Err(AccountError::InvalidVersion {
                reason: "version pointer is not a single consecutive branch".to_string(),
            }
            .into());
        }

        let mut chain = Self {
            max_versions: max_versions.max(1),
            versions,
        };
        while chain.versions.len() > chain.max_versions {
            chain.versions.pop_front();
        }
        Ok(chain)
    }
}
