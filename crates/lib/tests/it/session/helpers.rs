//! Helpers for Launcher tests

#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use safe_launcher::{
    Launcher, LauncherConfig, UserCredentials,
    network::{InMemoryNetwork, NetworkClient},
};
use tempfile::TempDir;

use crate::helpers::unique_credentials;

/// One user on one machine: a network, credentials and a config file location
pub struct Machine {
    pub dir: TempDir,
    pub network: Arc<InMemoryNetwork>,
    pub credentials: UserCredentials,
}

impl Machine {
    pub fn new() -> Self {
        Self::on(Arc::new(InMemoryNetwork::new()), unique_credentials())
    }

    /// Another machine for the same user on the same network
    pub fn other(&self) -> Self {
        Self::on(self.network.clone(), self.credentials.clone())
    }

    fn on(network: Arc<InMemoryNetwork>, credentials: UserCredentials) -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
            network,
            credentials,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join(".safe-launcher").join("config")
    }

    pub fn config(&self) -> LauncherConfig {
        LauncherConfig::new(self.config_path())
    }

    pub fn client(&self) -> Arc<dyn NetworkClient> {
        self.network.clone()
    }

    pub fn create_account(&self) -> Launcher {
        Launcher::create_account(self.credentials.clone(), self.client(), self.config())
            .expect("Failed to create account")
    }

    pub fn login(&self) -> Launcher {
        Launcher::login(self.credentials.clone(), self.client(), self.config())
            .expect("Failed to log in")
    }
}

pub fn add(launcher: &Launcher, name: &str) {
    launcher
        .add_app(name, format!("/opt/{name}"), "", vec![1], false)
        .expect("Failed to add app");
}
