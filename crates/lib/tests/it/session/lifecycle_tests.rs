//! Create, login, save and logout

use safe_launcher::{
    Launcher,
    network::{DataGetter, DataName, NetworkOp},
};

use super::helpers::*;
use crate::helpers::*;

#[test]
fn test_create_save_and_login() {
    let machine = Machine::new();
    let launcher = machine.create_account();
    assert_eq!(launcher.config_file_path().unwrap(), machine.config_path());
    launcher.save_session(true).unwrap();
    let timestamp = launcher.account_timestamp();

    let other = machine.other().login();
    assert!(other.account_apps().is_empty());
    assert!(other.get_apps(true).unwrap().is_empty());
    assert!(other.get_apps(false).unwrap().is_empty());
    assert_eq!(other.account_timestamp(), timestamp);
}

#[test]
fn test_create_existing_account() {
    let machine = Machine::new();
    let _launcher = machine.create_account();
    let stored = machine.network.len();

    let err = Launcher::create_account(
        machine.credentials.clone(),
        machine.client(),
        machine.other().config(),
    )
    .unwrap_err();
    assert!(err.is_already_exists());
    assert_eq!(machine.network.len(), stored);
}

#[test]
fn test_login_failures() {
    let machine = Machine::new();
    let err = Launcher::login(machine.credentials.clone(), machine.client(), machine.config())
        .unwrap_err();
    assert!(err.is_not_found());

    let _launcher = machine.create_account();
    let creds = &machine.credentials;
    let wrong = test_credentials(creds.keyword(), creds.pin(), "not the password");
    let err = Launcher::login(wrong, machine.client(), machine.other().config()).unwrap_err();
    assert!(err.is_crypto_error());
    assert!(err.is_authentication_error());
}

#[test]
fn test_save_without_changes_is_a_no_op() {
    let machine = Machine::new();
    let launcher = machine.create_account();
    let stored = machine.network.len();

    assert!(!launcher.has_unsaved_changes());
    launcher.save_session(false).unwrap();
    assert_eq!(machine.network.len(), stored);

    launcher.save_session(true).unwrap();
    assert_eq!(machine.network.len(), stored + 1);
}

#[test]
fn test_saved_apps_reach_other_machines() {
    let machine = Machine::new();
    let launcher = machine.create_account();
    add(&launcher, "Foo");
    assert!(launcher.has_unsaved_changes());

    launcher.save_session(false).unwrap();
    assert!(!launcher.has_unsaved_changes());

    let other = machine.other().login();
    assert!(other.get_apps(true).unwrap().is_empty());
    assert_eq!(names(&other.get_apps(false).unwrap()), vec!["Foo"]);
}

#[test]
fn test_failed_save_keeps_changes_pending() {
    let machine = Machine::new();
    let launcher = machine.create_account();
    add(&launcher, "Foo");
    let timestamp = launcher.account_timestamp();

    machine.network.fail_after(NetworkOp::Update, 0);
    assert!(launcher.save_session(false).unwrap_err().is_transient());
    assert!(launcher.has_unsaved_changes());
    assert_eq!(launcher.account_timestamp(), timestamp);

    machine.network.clear_faults();
    launcher.save_session(false).unwrap();
    assert!(!launcher.has_unsaved_changes());
}

#[test]
fn test_logout_saves_and_stops_the_network() {
    let machine = Machine::new();
    let launcher = machine.create_account();
    add(&launcher, "Foo");
    launcher.logout_and_stop().unwrap();

    let pointer = DataName::mutable(machine.credentials.account_location());
    assert!(machine.network.contains(&pointer));
    assert!(machine.network.get(&pointer).unwrap_err().is_network_error());
}

#[test]
fn test_logout_stops_the_network_even_if_the_save_fails() {
    let machine = Machine::new();
    let launcher = machine.create_account();
    machine.network.fail_after(NetworkOp::Update, 0);

    assert!(launcher.logout_and_stop().is_err());
    machine.network.clear_faults();
    let pointer = DataName::mutable(machine.credentials.account_location());
    assert!(machine.network.get(&pointer).is_err());
}
