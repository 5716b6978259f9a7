//! App registry
//!
//! Apps registered on this machine (`local_apps`, backed by the encrypted config file)
//! and apps known only through the account (`non_local_apps`, added elsewhere) are
//! disjoint and together make up `account.apps`. Every mutation keeps that partition.
//!
//! ## Locking
//!
//! Methods that change the registry take the session's account mutex and lock it
//! before the handler's own mutex, always in that order.
//!
//! ## Transactions
//!
//! Each mutation computes the new sets into local values, writes the config file, and
//! only then swaps the new sets into the registry and the account. A failure at any
//! step leaves both untouched. [`AppHandler::get_snapshot`] and
//! [`AppHandler::apply_snapshot`] let a caller undo a sequence of mutations.

mod config_file;
mod errors;
mod snapshot;
mod update;

use std::{
    collections::BTreeSet,
    fs,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

pub use errors::AppError;
pub use snapshot::Snapshot;
pub use update::AppUpdate;

use crate::{AccessRights, Account, AppDetails, DirectoryInfo, Identity, Result};
use snapshot::copy_config_file;

#[derive(Debug)]
struct Registry {
    config_file_path: PathBuf,
    local_apps: BTreeSet<AppDetails>,
    non_local_apps: BTreeSet<AppDetails>,
}

/// Owner of the local and non-local app sets and the config file.
#[derive(Debug, Default)]
pub struct AppHandler {
    registry: Mutex<Option<Registry>>,
}

impl AppHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<'a>(
        &'a self,
        account: &'a Mutex<Account>,
    ) -> (MutexGuard<'a, Account>, MutexGuard<'a, Option<Registry>>) {
        let account = account.lock().unwrap_or_else(PoisonError::into_inner);
        let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        (account, registry)
    }

    fn lock_registry(&self) -> MutexGuard<'_, Option<Registry>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_registry<T>(
        &self,
        account: &Mutex<Account>,
        op: impl FnOnce(&mut Account, &mut Registry) -> Result<T>,
    ) -> Result<T> {
        let (mut account, mut registry) = self.lock(account);
        let registry = registry.as_mut().ok_or(AppError::NotInitialised)?;
        let result = op(&mut account, &mut *registry)?;
        debug_assert!(is_partitioned(&account.apps, registry));
        Ok(result)
    }

    /// Load the config file at `config_file_path` and reconcile it with the account.
    ///
    /// Local entries the account does not know are dropped. Entries in both are local,
    /// with grants and icon taken from the account. The rest stay non-local.
    pub fn initialise(
        &self,
        config_file_path: impl Into<PathBuf>,
        account: &Mutex<Account>,
    ) -> Result<()> {
        let config_file_path = config_file_path.into();
        let (mut account, mut registry) = self.lock(account);
        if registry.is_some() {
            return Err(AppError::AlreadyInitialised.into());
        }

        if let Some(parent) = config_file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| config_file::io_error(parent, e))?;
        }

        let stored = config_file::read(&config_file_path, &account.config_key_and_iv)?;
        let mut non_local_apps = account.apps.clone();
        let mut local_apps = BTreeSet::new();
        let mut dropped = 0usize;
        for mut app in stored {
            match non_local_apps.take(app.name.as_str()) {
                Some(from_account) => {
                    app.permitted_dirs = from_account.permitted_dirs;
                    app.icon = from_account.icon;
                    local_apps.insert(app);
                }
                None => {
                    tracing::debug!(app = %app.name, "Dropping local app missing from account");
                    dropped += 1;
                }
            }
        }

        if dropped > 0 {
            config_file::write(&config_file_path, &local_apps, &account.config_key_and_iv)?;
        }

        let new_registry = Registry {
            config_file_path,
            local_apps,
            non_local_apps,
        };
        account.apps = union(&new_registry);
        tracing::info!(
            local = new_registry.local_apps.len(),
            non_local = new_registry.non_local_apps.len(),
            dropped,
            "Initialised app registry"
        );
        *registry = Some(new_registry);
        Ok(())
    }

    pub fn is_initialised(&self) -> bool {
        self.lock_registry().is_some()
    }

    pub fn config_file_path(&self) -> Result<PathBuf> {
        self.lock_registry()
            .as_ref()
            .map(|r| r.config_file_path.clone())
            .ok_or_else(|| AppError::NotInitialised.into())
    }

    /// Apps registered on this machine, or apps known only through the account.
    pub fn get_apps(&self, locally_available: bool) -> Result<BTreeSet<AppDetails>> {
        let registry = self.lock_registry();
        let registry = registry.as_ref().ok_or(AppError::NotInitialised)?;
        Ok(if locally_available {
            registry.local_apps.clone()
        } else {
            registry.non_local_apps.clone()
        })
    }

    /// Copy the registry and the config file.
    pub fn get_snapshot(&self, account: &Mutex<Account>) -> Result<Snapshot> {
        let (_account, registry) = self.lock(account);
        let registry = registry.as_ref().ok_or(AppError::NotInitialised)?;
        let config_file = copy_config_file(&registry.config_file_path)?.map(Arc::new);
        Ok(Snapshot {
            local_apps: registry.local_apps.clone(),
            non_local_apps: registry.non_local_apps.clone(),
            config_file,
        })
    }

    /// Restore the registry, `account.apps` and the config file to `snapshot`.
    pub fn apply_snapshot(&self, account: &Mutex<Account>, snapshot: &Snapshot) -> Result<()> {
        self.with_registry(account, |account, registry| {
            let live = &registry.config_file_path;
            match snapshot.config_file_path() {
                Some(copy) => {
                    let bytes = fs::read(copy).map_err(|e| config_file::io_error(copy, e))?;
                    config_file::write_atomic(live, &bytes)?;
                }
                None => config_file::remove(live)?,
            }

            registry.local_apps = snapshot.local_apps.clone();
            registry.non_local_apps = snapshot.non_local_apps.clone();
            account.apps = union(registry);
            tracing::info!(
                local = registry.local_apps.len(),
                non_local = registry.non_local_apps.len(),
                "Applied app registry snapshot"
            );
            Ok(())
        })
    }

    /// Add a new app (`icon` given) or link an app added elsewhere (`icon` omitted).
    ///
    /// Add fails if the name is in the account at all, and grants the app a read-write
    /// directory `/<name>` under the account's root. Link requires the name to be
    /// non-local; it keeps the account's grants and icon.
    pub fn add_or_link_app(
        &self,
        account: &Mutex<Account>,
        name: &str,
        path: impl Into<PathBuf>,
        args: impl Into<String>,
        icon: Option<Vec<u8>>,
        auto_start: bool,
    ) -> Result<AppDetails> {
        let path = path.into();
        let args = args.into();
        let linking = icon.is_none();
        self.with_registry(account, |account, registry| {
            let mut local_apps = registry.local_apps.clone();
            let mut non_local_apps = registry.non_local_apps.clone();
            let mut account_apps = account.apps.clone();

            let app = match icon {
                Some(icon) => {
                    if account_apps.contains(name) {
                        return Err(AppError::AppAlreadyExists {
                            name: name.to_string(),
                        }
                        .into());
                    }
                    let mut app = AppDetails {
                        name: name.to_string(),
                        path,
                        args,
                        icon,
                        auto_start,
                        ..Default::default()
                    };
                    if let Some(root) = account.root_parent_id {
                        app.regrant(DirectoryInfo::new(
                            format!("/{name}"),
                            root,
                            Identity::random(),
                            AccessRights::ReadWrite,
                        ));
                    }
                    app
                }
                None => {
                    if local_apps.contains(name) {
                        return Err(AppError::AppAlreadyExists {
                            name: name.to_string(),
                        }
                        .into());
                    }
                    let existing =
                        non_local_apps
                            .take(name)
                            .ok_or_else(|| AppError::NoSuchApp {
                                name: name.to_string(),
                            })?;
                    AppDetails {
                        path,
                        args,
                        auto_start,
                        ..existing
                    }
                }
            };

            local_apps.insert(app.clone());
            account_apps.replace(app.clone());
            config_file::write(
                &registry.config_file_path,
                &local_apps,
                &account.config_key_and_iv,
            )?;

            registry.local_apps = local_apps;
            registry.non_local_apps = non_local_apps;
            account.apps = account_apps;
            tracing::info!(app = %app.name, linking, "Registered app locally");
            Ok(app)
        })
    }

    /// Apply one change to the app called `name`, wherever it is registered.
    pub fn update(
        &self,
        account: &Mutex<Account>,
        name: &str,
        update: AppUpdate,
    ) -> Result<AppDetails> {
        self.with_registry(account, |account, registry| {
            let mut local_apps = registry.local_apps.clone();
            let mut non_local_apps = registry.non_local_apps.clone();
            let mut account_apps = account.apps.clone();

            let (set, existing) = match local_apps.take(name) {
                Some(app) => (&mut local_apps, app),
                None => match non_local_apps.take(name) {
                    Some(app) => (&mut non_local_apps, app),
                    None => {
                        return Err(AppError::NoSuchApp {
                            name: name.to_string(),
                        }
                        .into());
                    }
                },
            };

            if let AppUpdate::Rename(new_name) = &update {
                if new_name != name && account_apps.contains(new_name.as_str()) {
                    return Err(AppError::AppAlreadyExists {
                        name: new_name.clone(),
                    }
                    .into());
                }
            }

            let mut updated = existing;
            update.apply(&mut updated);
            set.insert(updated.clone());
            account_apps.remove(name);
            account_apps.insert(updated.clone());

            config_file::write(
                &registry.config_file_path,
                &local_apps,
                &account.config_key_and_iv,
            )?;

            registry.local_apps = local_apps;
            registry.non_local_apps = non_local_apps;
            account.apps = account_apps;
            tracing::debug!(app = %name, updated = %updated.name, "Updated app");
            Ok(updated)
        })
    }

    pub fn update_name(
        &self,
        account: &Mutex<Account>,
        name: &str,
        new_name: impl Into<String>,
    ) -> Result<AppDetails> {
        self.update(account, name, AppUpdate::Rename(new_name.into()))
    }

    pub fn update_path(
        &self,
        account: &Mutex<Account>,
        name: &str,
        path: impl Into<PathBuf>,
    ) -> Result<AppDetails> {
        self.update(account, name, AppUpdate::Reposition(path.into()))
    }

    pub fn update_args(
        &self,
        account: &Mutex<Account>,
        name: &str,
        args: impl Into<String>,
    ) -> Result<AppDetails> {
        self.update(account, name, AppUpdate::Rearg(args.into()))
    }

    pub fn update_permitted_dirs(
        &self,
        account: &Mutex<Account>,
        name: &str,
        dir: DirectoryInfo,
    ) -> Result<AppDetails> {
        self.update(account, name, AppUpdate::Regrant(dir))
    }

    pub fn update_icon(
        &self,
        account: &Mutex<Account>,
        name: &str,
        icon: Vec<u8>,
    ) -> Result<AppDetails> {
        self.update(account, name, AppUpdate::Reicon(icon))
    }

    pub fn update_auto_start(
        &self,
        account: &Mutex<Account>,
        name: &str,
        auto_start: bool,
    ) -> Result<AppDetails> {
        self.update(account, name, AppUpdate::ToggleAutoStart(auto_start))
    }

    /// Unregister `name` from this machine. It stays in the account as a non-local app.
    pub fn remove_locally(&self, account: &Mutex<Account>, name: &str) -> Result<()> {
        self.with_registry(account, |account, registry| {
            let mut local_apps = registry.local_apps.clone();
            let mut non_local_apps = registry.non_local_apps.clone();
            let mut account_apps = account.apps.clone();

            let removed = local_apps.take(name).ok_or_else(|| AppError::NoSuchApp {
                name: name.to_string(),
            })?;
            let remote = AppDetails {
                name: removed.name,
                permitted_dirs: removed.permitted_dirs,
                icon: removed.icon,
                ..Default::default()
            };
            non_local_apps.insert(remote.clone());
            account_apps.replace(remote);

            config_file::write(
                &registry.config_file_path,
                &local_apps,
                &account.config_key_and_iv,
            )?;

            registry.local_apps = local_apps;
            registry.non_local_apps = non_local_apps;
            account.apps = account_apps;
            tracing::info!(app = %name, "Removed app locally");
            Ok(())
        })
    }

    /// Remove a non-local app from the account.
    ///
    /// Apps registered on this machine must be removed locally first.
    pub fn remove_from_network(&self, account: &Mutex<Account>, name: &str) -> Result<()> {
        self.with_registry(account, |account, registry| {
            let mut non_local_apps = registry.non_local_apps.clone();
            let mut account_apps = account.apps.clone();

            if !non_local_apps.remove(name) || !account_apps.remove(name) {
                return Err(AppError::NoSuchApp {
                    name: name.to_string(),
                }
                .into());
            }

            registry.non_local_apps = non_local_apps;
            account.apps = account_apps;
            tracing::info!(app = %name, "Removed app from network");
            Ok(())
        })
    }

    /// Launch details of a locally registered app.
    pub fn get_path_and_args(&self, name: &str) -> Result<(PathBuf, String)> {
        let registry = self.lock_registry();
        let registry = registry.as_ref().ok_or(AppError::NotInitialised)?;
        registry
            .local_apps
            .get(name)
            .map(|app| (app.path.clone(), app.args.clone()))
            .ok_or_else(|| {
                AppError::NoSuchApp {
                    name: name.to_string(),
                }
                .into()
            })
    }

    /// Local apps flagged to start at login.
    pub fn auto_start_apps(&self) -> Result<Vec<AppDetails>> {
        let registry = self.lock_registry();
        let registry = registry.as_ref().ok_or(AppError::NotInitialised)?;
        Ok(registry
            .local_apps
            .iter()
            .filter(|app| app.auto_start)
            .cloned()
            .collect())
    }
}

fn union(registry: &Registry) -> BTreeSet<AppDetails> {
    registry
        .local_apps
        .iter()
        .chain(registry.non_local_apps.iter())
        .cloned()
        .collect()
}

fn is_partitioned(account_apps: &BTreeSet<AppDetails>, registry: &Registry) -> bool {
    registry.local_apps.is_disjoint(&registry.non_local_apps)
        && account_apps.len() == registry.local_apps.len() + registry.non_local_apps.len()
        && account_apps.iter().all(|app| {
            registry.local_apps.contains(app) || registry.non_local_apps.contains(app)
        })
}
