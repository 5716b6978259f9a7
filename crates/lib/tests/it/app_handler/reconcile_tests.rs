//! Loading the config file against the account

use std::fs;

use safe_launcher::app_handler::{AppError, AppHandler};

use super::helpers::*;
use crate::helpers::*;

#[test]
fn test_first_initialise_is_empty() {
    let (_dir, path) = config_path();
    let account = fresh_account();
    let handler = initialised(&path, &account);

    assert!(handler.get_apps(true).unwrap().is_empty());
    assert!(handler.get_apps(false).unwrap().is_empty());
    // Nothing to write until an app is added.
    assert!(!path.exists());
    assert!(path.parent().unwrap().is_dir());
}

#[test]
fn test_local_apps_missing_from_account_are_dropped() {
    let (_dir, path) = config_path();
    let account = fresh_account();
    let before_adds = copy_account(&account);

    let handler = initialised(&path, &account);
    add(&handler, &account, "Foo");
    add(&handler, &account, "Bar");
    let with_apps = copy_account(&account);

    // The account never saw Foo or Bar.
    let stale = initialised(&path, &before_adds);
    assert!(stale.get_apps(true).unwrap().is_empty());
    assert!(stale.get_apps(false).unwrap().is_empty());
    assert!(before_adds.lock().unwrap().apps().is_empty());

    // The drop was written back, so the apps are now only in the account.
    let reloaded = initialised(&path, &with_apps);
    assert!(reloaded.get_apps(true).unwrap().is_empty());
    assert_eq!(
        names(&reloaded.get_apps(false).unwrap()),
        vec!["Bar", "Foo"]
    );
}

#[test]
fn test_apps_in_both_are_local() {
    let (_dir, path) = config_path();
    let account = fresh_account();
    let handler = initialised(&path, &account);
    add(&handler, &account, "Foo");
    let only_foo = copy_account(&account);
    add(&handler, &account, "Bar");

    let other = initialised(&path, &only_foo);
    assert_eq!(names(&other.get_apps(true).unwrap()), vec!["Foo"]);
    assert!(other.get_apps(false).unwrap().is_empty());
    assert_eq!(names(only_foo.lock().unwrap().apps()), vec!["Foo"]);
}

#[test]
fn test_account_grants_and_local_launch_details() {
    let (_dir, path) = config_path();
    let account = fresh_account();
    let handler = initialised(&path, &account);
    add(&handler, &account, "Foo");
    handler
        .update_args(&account, "Foo", "--fullscreen")
        .unwrap();
    handler.update_icon(&account, "Foo", vec![7, 7]).unwrap();
    let saved = copy_account(&account);
    let saved_apps = saved.lock().unwrap().apps().clone();

    let other = initialised(&path, &saved);
    let local = other.get_apps(true).unwrap();
    let foo = local.get("Foo").unwrap();
    assert_eq!(foo.path.to_str(), Some("/opt/Foo"));
    assert_eq!(foo.args, "--fullscreen");
    assert_eq!(foo.icon, vec![7, 7]);
    assert_eq!(foo.permitted_dirs, saved_apps.get("Foo").unwrap().permitted_dirs);
    assert_eq!(foo.permitted_dirs.len(), 1);
}

#[test]
fn test_other_machine_sees_non_local_apps() {
    let (_dir, path) = config_path();
    let account = fresh_account();
    let handler = initialised(&path, &account);
    add(&handler, &account, "Foo");
    add(&handler, &account, "Bar");

    let (_other_dir, other_path) = config_path();
    let elsewhere = copy_account(&account);
    let other = initialised(&other_path, &elsewhere);
    assert!(other.get_apps(true).unwrap().is_empty());
    assert!(same_contents(
        &other.get_apps(false).unwrap(),
        elsewhere.lock().unwrap().apps()
    ));
}

#[test]
fn test_initialise_twice() {
    let (_dir, path) = config_path();
    let account = fresh_account();
    let handler = initialised(&path, &account);
    let err = handler.initialise(&path, &account).unwrap_err();
    assert!(matches!(
        err,
        safe_launcher::Error::App(AppError::AlreadyInitialised)
    ));
}

#[test]
fn test_unreadable_config_file() {
    let (_dir, path) = config_path();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"not a config file").unwrap();

    let account = fresh_account();
    let handler = AppHandler::new();
    let err = handler.initialise(&path, &account).unwrap_err();
    assert!(err.is_crypto_error());
    assert!(!handler.is_initialised());
    assert!(handler.get_apps(true).unwrap_err().is_invariant_violation());
}

#[test]
fn test_config_file_is_bound_to_the_account() {
    let (_dir, path) = config_path();
    let account = fresh_account();
    let handler = initialised(&path, &account);
    add(&handler, &account, "Foo");

    // A different account has a different config key.
    let err = AppHandler::new()
        .initialise(&path, &fresh_account())
        .unwrap_err();
    assert!(err.is_crypto_error());
}
