//! Remote store interface
//!
//! The launcher keeps two kinds of data on the network: immutable account blobs, named
//! by the hash of their content, and a mutable version pointer at a credential-derived
//! location. The store itself is a collaborator; this module defines the calls the
//! launcher makes against it and an in-process implementation.
//!
//! All calls block the calling thread.

mod errors;
mod in_memory;

pub use errors::NetworkError;
pub use in_memory::{InMemoryNetwork, NetworkOp};

use crate::{Identity, Result};

/// Whether data at a name may be overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataKind {
    /// Content-addressed and write-once.
    Immutable,
    /// Overwritable in place.
    Mutable,
}

/// The address of a piece of data on the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataName {
    pub id: Identity,
    pub kind: DataKind,
}

impl DataName {
    pub fn immutable(id: Identity) -> Self {
        Self {
            id,
            kind: DataKind::Immutable,
        }
    }

    pub fn mutable(id: Identity) -> Self {
        Self {
            id,
            kind: DataKind::Mutable,
        }
    }

    /// The content address of `content`.
    pub fn for_content(content: &[u8]) -> Self {
        Self::immutable(Identity::hash_of(content))
    }
}

impl std::fmt::Display for DataName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            DataKind::Immutable => "immutable",
            DataKind::Mutable => "mutable",
        };
        write!(f, "{kind}:{}", self.id)
    }
}

/// Read access to the network.
pub trait DataGetter: Send + Sync {
    /// Fetch the data stored at `name`.
    ///
    /// Fails with [`NetworkError::NoSuchData`] if nothing is stored there.
    fn get(&self, name: &DataName) -> Result<Vec<u8>>;
}

/// Read and write access to the network.
pub trait NetworkClient: DataGetter {
    /// Store new data. Fails with [`NetworkError::AlreadyExists`] if `name` is taken.
    fn store(&self, name: &DataName, content: Vec<u8>) -> Result<()>;

    /// Overwrite mutable data in place.
    ///
    /// Fails with [`NetworkError::NoSuchData`] if nothing is stored at `name`.
    fn update(&self, name: &DataName, content: Vec<u8>) -> Result<()>;

    /// Remove data. Fails with [`NetworkError::NoSuchData`] if nothing is stored there.
    fn delete(&self, name: &DataName) -> Result<()>;

    /// End the network session. Later calls fail with [`NetworkError::Unavailable`].
    fn stop(&self);
}
