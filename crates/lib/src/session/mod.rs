//! Session controller
//!
//! A [`Launcher`] owns the logged-in [`Account`] behind a mutex and lends it to the
//! [`AccountHandler`] for saves and to the [`AppHandler`] for registry changes.
//!
//! Every app operation runs as snapshot, mutate, then commit or revert. All but the
//! launch-detail changes (path, args, auto-start, local removal) also remember the
//! snapshot from before the first such change, so that
//! [`Launcher::revert_to_last_saved_session`] can undo everything since the last save.
//!
//! ## Locking
//!
//! Every mutating call holds the operation mutex from its snapshot until it has
//! committed or reverted, so calls never interleave. Under it the account mutex is
//! taken before the app registry, the pending rollback snapshot and the account
//! handler.

mod config;
mod errors;

use std::{
    collections::BTreeSet,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, Utc};

pub use config::LauncherConfig;
pub use errors::SessionError;

use crate::{
    AccessRights, Account, AppDetails, DirectoryInfo, Result, UserCredentials,
    account_handler::AccountHandler,
    app_handler::{AppHandler, AppUpdate, Snapshot},
    constants::SAFE_DRIVE_DIR_NAME,
    network::NetworkClient,
    passport::Passport,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A logged-in user's session.
pub struct Launcher {
    network: Arc<dyn NetworkClient>,
    account: Mutex<Account>,
    account_handler: Mutex<AccountHandler>,
    app_handler: AppHandler,
    /// Serialises mutating calls
    operation: Mutex<()>,
    /// Registry state at the first account-changing operation since the last save
    rollback_snapshot: Mutex<Option<Snapshot>>,
}

impl Launcher {
    /// Create a new account and start a session on it.
    ///
    /// The config file is loaded before anything is stored on the network, so an
    /// unreadable config file leaves the network untouched.
    pub fn create_account(
        credentials: UserCredentials,
        network: Arc<dyn NetworkClient>,
        config: LauncherConfig,
    ) -> Result<Self> {
        let launcher = Self::with_account(
            Account::new(Passport::generate()),
            AccountHandler::new(config.max_versions, config.clock),
            network,
        );
        launcher
            .app_handler
            .initialise(config.config_file_path, &launcher.account)?;

        {
            let mut account = lock(&launcher.account);
            lock(&launcher.account_handler).create(
                credentials,
                &mut account,
                launcher.network.as_ref(),
            )?;
        }
        Ok(launcher)
    }

    /// Log in to an existing account and start a session on it.
    pub fn login(
        credentials: UserCredentials,
        network: Arc<dyn NetworkClient>,
        config: LauncherConfig,
    ) -> Result<Self> {
        let mut account_handler = AccountHandler::new(config.max_versions, config.clock);
        let account = account_handler.login(credentials, network.as_ref())?;
        let launcher = Self::with_account(account, account_handler, network);
        launcher
            .app_handler
            .initialise(config.config_file_path, &launcher.account)?;
        Ok(launcher)
    }

    fn with_account(
        account: Account,
        account_handler: AccountHandler,
        network: Arc<dyn NetworkClient>,
    ) -> Self {
        Self {
            network,
            account: Mutex::new(account),
            account_handler: Mutex::new(account_handler),
            app_handler: AppHandler::new(),
            operation: Mutex::new(()),
            rollback_snapshot: Mutex::new(None),
        }
    }

    /// Save the account one last time and end the network session.
    ///
    /// The network is stopped even if the save fails; the save's error is returned.
    pub fn logout_and_stop(self) -> Result<()> {
        let saved = self.save_session(true);
        if let Err(e) = &saved {
            tracing::error!(error = %e, "Final save failed");
        }
        self.network.stop();
        tracing::info!("Logged out");
        saved
    }

    /// Save the account if it changed since the last save, or unconditionally if `force`.
    pub fn save_session(&self, force: bool) -> Result<()> {
        let _operation = lock(&self.operation);
        let mut account = lock(&self.account);
        let mut pending = lock(&self.rollback_snapshot);
        if !force && pending.is_none() {
            tracing::debug!("No account changes to save");
            return Ok(());
        }
        lock(&self.account_handler).save(&mut account, self.network.as_ref())?;
        *pending = None;
        Ok(())
    }

    /// Undo every account-changing operation since the last save.
    ///
    /// A no-op when there is nothing to undo.
    pub fn revert_to_last_saved_session(&self) -> Result<()> {
        let _operation = lock(&self.operation);
        let Some(snapshot) = lock(&self.rollback_snapshot).take() else {
            return Ok(());
        };
        if let Err(e) = self.app_handler.apply_snapshot(&self.account, &snapshot) {
            self.remember_rollback(snapshot);
            return Err(e);
        }
        tracing::info!("Reverted to last saved session");
        Ok(())
    }

    /// True if an account-changing operation succeeded since the last save.
    pub fn has_unsaved_changes(&self) -> bool {
        lock(&self.rollback_snapshot).is_some()
    }

    /// Keeps the oldest snapshot since the last save.
    fn remember_rollback(&self, snapshot: Snapshot) {
        let mut pending = lock(&self.rollback_snapshot);
        if pending.is_none() {
            *pending = Some(snapshot);
        }
    }

    /// Run `op` against a snapshot; restore the snapshot if it fails.
    ///
    /// No other mutating call runs between the snapshot and the commit or revert.
    fn guarded<T>(&self, keep_rollback: bool, op: impl FnOnce() -> Result<T>) -> Result<T> {
        let _operation = lock(&self.operation);
        let snapshot = self.app_handler.get_snapshot(&self.account)?;
        match op() {
            Ok(value) => {
                if keep_rollback {
                    self.remember_rollback(snapshot);
                }
                Ok(value)
            }
            Err(e) => match self.app_handler.apply_snapshot(&self.account, &snapshot) {
                Ok(()) => {
                    tracing::warn!(error = %e, "Operation failed; restored snapshot");
                    Err(e)
                }
                Err(revert) => {
                    tracing::error!(error = %e, revert_error = %revert, "Failed to restore snapshot");
                    Err(SessionError::RevertFailed {
                        reason: format!("{e}; while reverting: {revert}"),
                    }
                    .into())
                }
            },
        }
    }

    /// Apps registered on this machine, or apps known only through the account.
    pub fn get_apps(&self, locally_available: bool) -> Result<BTreeSet<AppDetails>> {
        self.app_handler.get_apps(locally_available)
    }

    /// Register a new app on this machine and in the account.
    pub fn add_app(
        &self,
        name: &str,
        path: impl Into<PathBuf>,
        args: impl Into<String>,
        icon: Vec<u8>,
        auto_start: bool,
    ) -> Result<AppDetails> {
        self.guarded(true, || {
            self.app_handler
                .add_or_link_app(&self.account, name, path, args, Some(icon), auto_start)
        })
    }

    /// Register on this machine an app that was added to the account elsewhere.
    pub fn link_app(
        &self,
        name: &str,
        path: impl Into<PathBuf>,
        args: impl Into<String>,
        auto_start: bool,
    ) -> Result<AppDetails> {
        self.guarded(true, || {
            self.app_handler
                .add_or_link_app(&self.account, name, path, args, None, auto_start)
        })
    }

    /// Apply one change to an app.
    pub fn update_app(&self, name: &str, update: AppUpdate) -> Result<AppDetails> {
        let keep_rollback = !update.is_local_only();
        self.guarded(keep_rollback, || {
            self.app_handler.update(&self.account, name, update)
        })
    }

    pub fn update_app_name(&self, name: &str, new_name: impl Into<String>) -> Result<AppDetails> {
        self.update_app(name, AppUpdate::Rename(new_name.into()))
    }

    pub fn update_app_path(&self, name: &str, path: impl Into<PathBuf>) -> Result<AppDetails> {
        self.update_app(name, AppUpdate::Reposition(path.into()))
    }

    pub fn update_app_args(&self, name: &str, args: impl Into<String>) -> Result<AppDetails> {
        self.update_app(name, AppUpdate::Rearg(args.into()))
    }

    pub fn update_app_permitted_dirs(&self, name: &str, dir: DirectoryInfo) -> Result<AppDetails> {
        self.update_app(name, AppUpdate::Regrant(dir))
    }

    pub fn update_app_icon(&self, name: &str, icon: Vec<u8>) -> Result<AppDetails> {
        self.update_app(name, AppUpdate::Reicon(icon))
    }

    pub fn update_app_auto_start(&self, name: &str, auto_start: bool) -> Result<AppDetails> {
        self.update_app(name, AppUpdate::ToggleAutoStart(auto_start))
    }

    /// Grant, change or revoke (`AccessRights::None`) an app's access to the user's
    /// drive directory.
    pub fn update_app_safe_drive_access(
        &self,
        name: &str,
        rights: AccessRights,
    ) -> Result<AppDetails> {
        let dir = {
            let account = lock(&self.account);
            let parent_id = account
                .unique_user_id
                .ok_or(SessionError::IncompleteAccount {
                    missing: "unique user id",
                })?;
            let directory_id = account
                .root_parent_id
                .ok_or(SessionError::IncompleteAccount {
                    missing: "root directory id",
                })?;
            DirectoryInfo::new(SAFE_DRIVE_DIR_NAME, parent_id, directory_id, rights)
        };
        self.update_app_permitted_dirs(name, dir)
    }

    /// Unregister an app from this machine; it stays in the account.
    pub fn remove_app_locally(&self, name: &str) -> Result<()> {
        self.guarded(false, || self.app_handler.remove_locally(&self.account, name))
    }

    /// Remove an app registered elsewhere from the account.
    pub fn remove_app_from_network(&self, name: &str) -> Result<()> {
        self.guarded(true, || {
            self.app_handler.remove_from_network(&self.account, name)
        })
    }

    /// Launch details of a locally registered app.
    pub fn get_path_and_args(&self, name: &str) -> Result<(PathBuf, String)> {
        self.app_handler.get_path_and_args(name)
    }

    /// Local apps flagged to start at login.
    pub fn auto_start_apps(&self) -> Result<Vec<AppDetails>> {
        self.app_handler.auto_start_apps()
    }

    /// Every app in the account.
    pub fn account_apps(&self) -> BTreeSet<AppDetails> {
        lock(&self.account).apps.clone()
    }

    /// Time of the account's last encryption.
    pub fn account_timestamp(&self) -> DateTime<Utc> {
        lock(&self.account).timestamp
    }

    pub fn config_file_path(&self) -> Result<PathBuf> {
        self.app_handler.config_file_path()
    }
}

impl std::fmt::Debug for Launcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Launcher")
            .field("account", &self.account)
            .field("app_handler", &self.app_handler)
            .field("has_unsaved_changes", &self.has_unsaved_changes())
            .finish_non_exhaustive()
    }
}
