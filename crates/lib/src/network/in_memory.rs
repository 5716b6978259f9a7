//! In-process network store.

use std::{
    collections::HashMap,
    sync::{
        PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
        atomic::{AtomicBool, Ordering},
    },
};

use super::{DataGetter, DataKind, DataName, NetworkClient, NetworkError};
use crate::Result;

/// Network operations, as named by fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkOp {
    Get,
    Store,
    Update,
    Delete,
}

/// A network store held in a `HashMap`.
///
/// Suitable for tests and for running the launcher without a real network. Cloning
/// data out on every `get` mirrors a remote fetch.
#[derive(Debug, Default)]
pub struct InMemoryNetwork {
    data: RwLock<HashMap<DataName, Vec<u8>>>,
    stopped: AtomicBool,
    /// Remaining successful calls per operation before it starts failing
    #[cfg(any(test, feature = "testing"))]
    faults: RwLock<HashMap<NetworkOp, usize>>,
}

impl InMemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if something is stored at `name`.
    pub fn contains(&self, name: &DataName) -> bool {
        self.read().contains_key(name)
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// After `successes` more successful `op` calls, every further `op` call fails with
    /// [`NetworkError::Unavailable`] until [`clear_faults`](Self::clear_faults).
    #[cfg(any(test, feature = "testing"))]
    pub fn fail_after(&self, op: NetworkOp, successes: usize) {
        self.faults
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(op, successes);
    }

    #[cfg(any(test, feature = "testing"))]
    pub fn clear_faults(&self) {
        self.faults
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<DataName, Vec<u8>>> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<DataName, Vec<u8>>> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(any(test, feature = "testing"))]
    fn check_fault(&self, op: NetworkOp) -> Result<()> {
        let mut faults = self.faults.write().unwrap_or_else(PoisonError::into_inner);
        match faults.get_mut(&op) {
            Some(0) => Err(NetworkError::Unavailable {
                reason: format!("injected {op:?} failure"),
            }
            .into()),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn check_running(&self) -> Result<()> {
        if self.stopped.load(Ordering::Acquire) {
            return Err(NetworkError::Unavailable {
                reason: "network session stopped".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn precheck(&self, op: NetworkOp) -> Result<()> {
        self.check_running()?;
        #[cfg(any(test, feature = "testing"))]
        self.check_fault(op)?;
        #[cfg(not(any(test, feature = "testing")))]
        let _ = op;
        Ok(())
    }
}

impl DataGetter for InMemoryNetwork {
    fn get(&self, name: &DataName) -> Result<Vec<u8>> {
        self.precheck(NetworkOp::Get)?;
        self.read()
            .get(name)
            .cloned()
            .ok_or_else(|| NetworkError::NoSuchData { name: *name }.into())
    }
}

impl NetworkClient for InMemoryNetwork {
    fn store(&self, name: &DataName, content: Vec<u8>) -> Result<()> {
        self.precheck(NetworkOp::Store)?;
        let mut data = self.write();
        if data.contains_key(name) {
            return Err(NetworkError::AlreadyExists { name: *name }.into());
        }
        tracing::trace!(%name, bytes = content.len(), "Stored data");
        data.insert(*name, content);
        Ok(())
    }

    fn update(&self, name: &DataName, content: Vec<u8>) -> Result<()> {
        self.precheck(NetworkOp::Update)?;
        if name.kind == DataKind::Immutable {
            // Immutable data is only ever replaced by deleting it first.
            return Err(NetworkError::AlreadyExists { name: *name }.into());
        }
        let mut data = self.write();
        match data.get_mut(name) {
            Some(existing) => {
                *existing = content;
                Ok(())
            }
            None => Err(NetworkError::NoSuchData { name: *name }.into()),
        }
    }

    fn delete(&self, name: &DataName) -> Result<()> {
        self.precheck(NetworkOp::Delete)?;
        match self.write().remove(name) {
            Some(_) => Ok(()),
            None => Err(NetworkError::NoSuchData { name: *name }.into()),
        }
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
        tracing::debug!("Network session stopped");
    }
}
