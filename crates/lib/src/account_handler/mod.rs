//! Account lifecycle against the network
//!
//! An [`AccountHandler`] manages exactly one session. It creates a new account or logs
//! in to an existing one, after which it can save the in-memory [`Account`] back to the
//! network.
//!
//! ## Layout on the network
//!
//! - Each save stores a new immutable, encrypted account blob named by its hash.
//! - A mutable [`VersionChain`] at [`UserCredentials::account_location`] lists the saved
//!   blobs; its tip is the current account.
//!
//! Every protocol step that fails partway deletes what it already stored and restores
//! the account's timestamp, so the previous version stays authoritative.

mod errors;
mod versions;

use std::sync::Arc;

pub use errors::AccountError;
pub use versions::{VersionChain, VersionName};

use crate::{
    Account, Clock, Identity, Result, UserCredentials,
    account::{decrypt_account, encrypt_account},
    network::{DataGetter, DataName, NetworkClient},
};

/// The session state held after a successful create or login.
#[derive(Debug)]
struct LoggedIn {
    credentials: UserCredentials,
    versions: VersionChain,
}

/// Creates, logs in to, and saves one user's account.
#[derive(Debug)]
pub struct AccountHandler {
    session: Option<LoggedIn>,
    max_versions: usize,
    clock: Arc<dyn Clock>,
}

impl AccountHandler {
    pub fn new(max_versions: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            session: None,
            max_versions,
            clock,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// The current tip of this session's version chain.
    pub fn tip(&self) -> Option<&VersionName> {
        self.session.as_ref().and_then(|s| s.versions.tip())
    }

    pub fn credentials(&self) -> Option<&UserCredentials> {
        self.session.as_ref().map(|s| &s.credentials)
    }

    /// Persist a new account and log in to it.
    ///
    /// Stores the encrypted blob, then a version pointer naming it as version 0. If the
    /// pointer cannot be stored (for example because an account already exists at these
    /// credentials) the blob is deleted again.
    pub fn create<N>(
        &mut self,
        credentials: UserCredentials,
        account: &mut Account,
        network: &N,
    ) -> Result<()>
    where
        N: NetworkClient + ?Sized,
    {
        if self.session.is_some() {
            return Err(AccountError::AlreadyLoggedIn.into());
        }

        let location = credentials.account_location();
        let pointer = DataName::mutable(location);
        let previous_timestamp = account.timestamp;

        let blob = encrypt_account(&credentials, account, self.clock.as_ref())?;
        let blob_name = DataName::for_content(&blob);
        if let Err(e) = network.store(&blob_name, blob) {
            account.timestamp = previous_timestamp;
            return Err(e);
        }

        let mut versions = VersionChain::new(self.max_versions);
        let stored = versions
            .put(
                None,
                VersionName {
                    index: 0,
                    id: blob_name.id,
                },
            )
            .and_then(|()| versions.serialise())
            .and_then(|bytes| network.store(&pointer, bytes));
        if let Err(e) = stored {
            account.timestamp = previous_timestamp;
            delete_compensating(network, &blob_name);
            return Err(e);
        }

        tracing::info!(%location, "Created account");
        self.session = Some(LoggedIn {
            credentials,
            versions,
        });
        Ok(())
    }

    /// Fetch and decrypt the account at the credentials' location.
    ///
    /// Fails with [`AccountError::NoSuchAccount`] if there is no version pointer, and with
    /// a crypto error if the blob does not decrypt under these credentials.
    pub fn login<G>(&mut self, credentials: UserCredentials, network: &G) -> Result<Account>
    where
        G: DataGetter + ?Sized,
    {
        if self.session.is_some() {
            return Err(AccountError::AlreadyLoggedIn.into());
        }

        let location = credentials.account_location();
        let versions = fetch_versions(network, location, self.max_versions)?;
        let tip = *versions.tip().ok_or_else(|| AccountError::InvalidVersion {
            reason: "version pointer has no tip".to_string(),
        })?;

        let blob = network.get(&DataName::immutable(tip.id))?;
        let account = decrypt_account(&blob, &credentials)?;

        tracing::info!(%location, index = tip.index, "Logged in");
        self.session = Some(LoggedIn {
            credentials,
            versions,
        });
        Ok(account)
    }

    /// Save `account` as the next version.
    ///
    /// Fails with [`AccountError::StaleVersion`] if the remote pointer no longer has this
    /// session's tip; the caller decides whether to log in again and retry. On any
    /// failure the account's timestamp is restored and the new blob deleted.
    pub fn save<N>(&mut self, account: &mut Account, network: &N) -> Result<()>
    where
        N: NetworkClient + ?Sized,
    {
        let max_versions = self.max_versions;
        let session = self.session.as_mut().ok_or(AccountError::NotLoggedIn)?;
        let location = session.credentials.account_location();
        let previous_timestamp = account.timestamp;

        let blob = encrypt_account(&session.credentials, account, self.clock.as_ref())?;
        let blob_name = DataName::for_content(&blob);
        if let Err(e) = network.store(&blob_name, blob) {
            account.timestamp = previous_timestamp;
            return Err(e);
        }

        match append_version(
            network,
            location,
            &session.versions,
            blob_name.id,
            max_versions,
        ) {
            Ok(versions) => {
                tracing::info!(
                    %location,
                    index = versions.tip().map_or(0, |v| v.index),
                    "Saved account"
                );
                session.versions = versions;
                Ok(())
            }
            Err(e) => {
                account.timestamp = previous_timestamp;
                delete_compensating(network, &blob_name);
                Err(e)
            }
        }
    }
}

fn fetch_versions<G>(network: &G, location: Identity, max_versions: usize) -> Result<VersionChain>
where
    G: DataGetter + ?Sized,
{
    let bytes = network.get(&DataName::mutable(location)).map_err(|e| {
        if e.is_not_found() {
            AccountError::NoSuchAccount { location }.into()
        } else {
            e
        }
    })?;
    VersionChain::parse(&bytes, max_versions)
}

/// Checks the remote pointer still has `cached`'s tip, then writes the extended chain.
fn append_version<N>(
    network: &N,
    location: Identity,
    cached: &VersionChain,
    blob_id: Identity,
    max_versions: usize,
) -> Result<VersionChain>
where
    N: NetworkClient + ?Sized,
{
    let remote = fetch_versions(network, location, max_versions)?;
    let tip = *cached.tip().ok_or(AccountError::NotLoggedIn)?;
    if remote.tip() != Some(&tip) {
        return Err(AccountError::StaleVersion {
            expected: tip.index,
            found: remote.tip().map_or(0, |v| v.index),
        }
        .into());
    }

    let mut versions = cached.clone();
    versions.put(
        Some(&tip),
        VersionName {
            index: tip.index + 1,
            id: blob_id,
        },
    )?;
    network.update(&DataName::mutable(location), versions.serialise()?)?;
    Ok(versions)
}

fn delete_compensating<N>(network: &N, name: &DataName)
where
    N: NetworkClient + ?Sized,
{
    match network.delete(name) {
        Ok(()) => tracing::warn!(%name, "Deleted partially stored account data"),
        Err(e) => tracing::error!(%name, error = %e, "Failed to delete partially stored account data"),
    }
}
