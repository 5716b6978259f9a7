//! Helpers for AppHandler tests

#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use safe_launcher::{
    Account, FixedClock,
    account::{decrypt_account, encrypt_account},
    app_handler::AppHandler,
    passport::Passport,
};
use tempfile::TempDir;

use crate::helpers::test_credentials;

pub fn fresh_account() -> Mutex<Account> {
    Mutex::new(Account::new(Passport::generate()))
}

/// An independent copy of the account as it is now, made by a save-and-load round trip
pub fn copy_account(account: &Mutex<Account>) -> Mutex<Account> {
    let creds = test_credentials("copy", 1, "copy");
    let mut account = account.lock().unwrap();
    let blob = encrypt_account(&creds, &mut account, &FixedClock::default())
        .expect("Failed to encrypt account");
    Mutex::new(decrypt_account(&blob, &creds).expect("Failed to decrypt account"))
}

/// A config file path inside a fresh temp dir; keep the dir alive for the test
pub fn config_path() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("launcher").join("config");
    (dir, path)
}

pub fn initialised(path: &Path, account: &Mutex<Account>) -> AppHandler {
    let handler = AppHandler::new();
    handler
        .initialise(path, account)
        .expect("Failed to initialise app handler");
    handler
}

/// Add an app with a fixed path, no args and a one-byte icon
pub fn add(handler: &AppHandler, account: &Mutex<Account>, name: &str) {
    handler
        .add_or_link_app(account, name, format!("/opt/{name}"), "", Some(vec![1]), false)
        .expect("Failed to add app");
}
