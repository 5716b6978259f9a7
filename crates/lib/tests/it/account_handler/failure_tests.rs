//! Partial failures and their compensation

use safe_launcher::{
    account_handler::AccountError,
    network::{NetworkClient, NetworkOp},
};

use super::helpers::*;
use crate::helpers::*;

#[test]
fn test_save_failure_reverts_timestamp_and_deletes_blob() {
    let creds = unique_credentials();
    let (network, mut handler, mut account) = created_account(&creds);
    let timestamp = account.timestamp();
    let tip = *handler.tip().unwrap();

    network.fail_after(NetworkOp::Update, 0);
    let err = handler.save(&mut account, &network).unwrap_err();
    assert!(err.is_transient());

    assert_eq!(account.timestamp(), timestamp);
    assert_eq!(handler.tip(), Some(&tip));
    // Only the original blob and pointer remain.
    assert_eq!(network.len(), 2);

    network.clear_faults();
    handler.save(&mut account, &network).expect("retry succeeds");
    assert_eq!(handler.tip().map(|v| v.index), Some(1));
}

#[test]
fn test_save_failure_storing_blob() {
    let creds = unique_credentials();
    let (network, mut handler, mut account) = created_account(&creds);
    let timestamp = account.timestamp();

    network.fail_after(NetworkOp::Store, 0);
    assert!(handler.save(&mut account, &network).is_err());
    assert_eq!(account.timestamp(), timestamp);
    assert_eq!(network.len(), 2);
}

#[test]
fn test_create_failure_storing_pointer_leaves_nothing() {
    let creds = unique_credentials();
    let network = safe_launcher::network::InMemoryNetwork::new();
    let mut account = safe_launcher::Account::new(safe_launcher::passport::Passport::generate());

    // The blob store succeeds, the pointer store fails.
    network.fail_after(NetworkOp::Store, 1);
    let mut handler = new_handler();
    assert!(handler.create(creds, &mut account, &network).is_err());
    assert!(network.is_empty());
    assert!(!handler.is_logged_in());
}

#[test]
fn test_stale_tip_is_reported() {
    let creds = unique_credentials();
    let (network, mut first, mut first_account) = created_account(&creds);

    let mut second = new_handler();
    let mut second_account = second.login(creds.clone(), &network).unwrap();
    second.save(&mut second_account, &network).unwrap();

    let before = network.len();
    let timestamp = first_account.timestamp();
    let err = first.save(&mut first_account, &network).unwrap_err();
    assert!(matches!(
        err,
        safe_launcher::Error::Account(AccountError::StaleVersion {
            expected: 0,
            found: 1
        })
    ));
    assert!(err.is_transient());
    assert_eq!(first_account.timestamp(), timestamp);
    assert_eq!(network.len(), before);
}

#[test]
fn test_missing_pointer_on_save() {
    let creds = unique_credentials();
    let (network, mut handler, mut account) = created_account(&creds);
    network.delete(&pointer_name(&creds)).unwrap();

    let err = handler.save(&mut account, &network).unwrap_err();
    assert!(err.is_not_found());
}
