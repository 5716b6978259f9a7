//! Add, link, update and remove

use std::fs;

use safe_launcher::{
    AccessRights, DirectoryInfo, Identity,
    app_handler::{AppError, AppHandler},
};

use super::helpers::*;
use crate::helpers::*;

fn foo_grant(handler: &AppHandler) -> DirectoryInfo {
    let local = handler.get_apps(true).unwrap();
    local
        .get("Foo")
        .unwrap()
        .permitted_dirs
        .iter()
        .next()
        .cloned()
        .expect("Foo has a default grant")
}

#[test]
fn test_add_grants_own_directory() {
    let (_dir, path) = config_path();
    let account = fresh_account();
    let handler = initialised(&path, &account);

    let app = handler
        .add_or_link_app(&account, "Foo", "/opt/foo", "-q", Some(vec![9]), true)
        .unwrap();
    assert_eq!(app.permitted_dirs.len(), 1);
    let grant = app.permitted_dirs.iter().next().unwrap();
    assert_eq!(grant.path, "/Foo");
    assert_eq!(grant.access_rights, AccessRights::ReadWrite);
    assert_eq!(
        Some(grant.parent_id),
        account.lock().unwrap().root_parent_id()
    );

    assert!(path.exists());
    assert_eq!(handler.get_path_and_args("Foo").unwrap().1, "-q");
    assert_eq!(handler.auto_start_apps().unwrap().len(), 1);
    assert_eq!(names(account.lock().unwrap().apps()), vec!["Foo"]);
}

#[test]
fn test_add_duplicate_changes_nothing() {
    let (_dir, path) = config_path();
    let account = fresh_account();
    let handler = initialised(&path, &account);
    add(&handler, &account, "Foo");
    let local = handler.get_apps(true).unwrap();
    let file = fs::read(&path).unwrap();

    let err = handler
        .add_or_link_app(&account, "Foo", "/elsewhere", "", Some(vec![]), false)
        .unwrap_err();
    assert!(err.is_already_exists());
    assert!(same_contents(&handler.get_apps(true).unwrap(), &local));
    assert_eq!(fs::read(&path).unwrap(), file);
}

#[test]
fn test_link_rules() {
    let (_dir, path) = config_path();
    let account = fresh_account();
    let handler = initialised(&path, &account);
    add(&handler, &account, "Foo");
    add(&handler, &account, "Bar");

    let (_other_dir, other_path) = config_path();
    let elsewhere = copy_account(&account);
    let other = initialised(&other_path, &elsewhere);

    let err = other
        .add_or_link_app(&elsewhere, "Bar", "/x", "", Some(vec![]), false)
        .unwrap_err();
    assert!(err.is_already_exists());

    let err = other
        .add_or_link_app(&elsewhere, "Baz", "/x", "", None, false)
        .unwrap_err();
    assert!(err.is_not_found());

    let linked = other
        .add_or_link_app(&elsewhere, "Foo", "/usr/bin/foo", "--x", None, false)
        .unwrap();
    assert_eq!(linked.path.to_str(), Some("/usr/bin/foo"));
    assert_eq!(linked.icon, vec![1]);
    assert_eq!(linked.permitted_dirs.len(), 1);
    assert_eq!(names(&other.get_apps(true).unwrap()), vec!["Foo"]);
    assert_eq!(names(&other.get_apps(false).unwrap()), vec!["Bar"]);
    assert_eq!(names(elsewhere.lock().unwrap().apps()), vec!["Bar", "Foo"]);

    let err = other
        .add_or_link_app(&elsewhere, "Foo", "/again", "", None, false)
        .unwrap_err();
    assert!(err.is_already_exists());
}

#[test]
fn test_revoking_a_grant_removes_it() {
    let (_dir, path) = config_path();
    let account = fresh_account();
    let handler = initialised(&path, &account);
    add(&handler, &account, "Foo");
    let grant = foo_grant(&handler);

    let read_only = DirectoryInfo {
        access_rights: AccessRights::ReadOnly,
        ..grant.clone()
    };
    let app = handler
        .update_permitted_dirs(&account, "Foo", read_only.clone())
        .unwrap();
    assert_eq!(app.permitted_dirs.len(), 1);
    assert!(app.permitted_dirs.contains(&read_only));

    let revoked = DirectoryInfo {
        access_rights: AccessRights::None,
        ..grant
    };
    let app = handler
        .update_permitted_dirs(&account, "Foo", revoked)
        .unwrap();
    assert!(app.permitted_dirs.is_empty());
    let in_account = account.lock().unwrap().apps().get("Foo").cloned().unwrap();
    assert!(in_account.permitted_dirs.is_empty());
}

#[test]
fn test_revoking_an_unknown_grant_is_a_no_op() {
    let (_dir, path) = config_path();
    let account = fresh_account();
    let handler = initialised(&path, &account);
    add(&handler, &account, "Foo");

    let unknown = DirectoryInfo::new("/nope", Identity::random(), Identity::random(), AccessRights::None);
    let app = handler.update_permitted_dirs(&account, "Foo", unknown).unwrap();
    assert_eq!(app.permitted_dirs.len(), 1);
}

#[test]
fn test_rename() {
    let (_dir, path) = config_path();
    let account = fresh_account();
    let handler = initialised(&path, &account);
    add(&handler, &account, "Foo");
    add(&handler, &account, "Bar");

    let err = handler.update_name(&account, "Foo", "Bar").unwrap_err();
    assert!(matches!(
        err,
        safe_launcher::Error::App(AppError::AppAlreadyExists { ref name }) if name == "Bar"
    ));
    assert_eq!(names(&handler.get_apps(true).unwrap()), vec!["Bar", "Foo"]);

    handler.update_name(&account, "Foo", "Qux").unwrap();
    assert_eq!(names(&handler.get_apps(true).unwrap()), vec!["Bar", "Qux"]);
    assert_eq!(names(account.lock().unwrap().apps()), vec!["Bar", "Qux"]);
    assert!(handler.get_path_and_args("Foo").unwrap_err().is_not_found());
    assert_eq!(
        handler.get_path_and_args("Qux").unwrap().0.to_str(),
        Some("/opt/Foo")
    );
}

#[test]
fn test_update_non_local_app() {
    let (_dir, path) = config_path();
    let account = fresh_account();
    let handler = initialised(&path, &account);
    add(&handler, &account, "Foo");

    let (_other_dir, other_path) = config_path();
    let elsewhere = copy_account(&account);
    let other = initialised(&other_path, &elsewhere);
    other.update_icon(&elsewhere, "Foo", vec![3]).unwrap();

    let non_local = other.get_apps(false).unwrap();
    assert_eq!(non_local.get("Foo").unwrap().icon, vec![3]);
    assert_eq!(elsewhere.lock().unwrap().apps().get("Foo").unwrap().icon, vec![3]);
    assert!(other.get_apps(true).unwrap().is_empty());
}

#[test]
fn test_update_missing_app() {
    let (_dir, path) = config_path();
    let account = fresh_account();
    let handler = initialised(&path, &account);
    let err = handler.update_auto_start(&account, "Foo", true).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_remove_locally_then_from_network() {
    let (_dir, path) = config_path();
    let account = fresh_account();
    let handler = initialised(&path, &account);
    add(&handler, &account, "Foo");

    let err = handler.remove_from_network(&account, "Foo").unwrap_err();
    assert!(err.is_not_found());

    handler.remove_locally(&account, "Foo").unwrap();
    assert!(handler.get_apps(true).unwrap().is_empty());
    let non_local = handler.get_apps(false).unwrap();
    let foo = non_local.get("Foo").unwrap();
    assert!(foo.path.as_os_str().is_empty());
    assert_eq!(foo.permitted_dirs.len(), 1);
    assert_eq!(names(account.lock().unwrap().apps()), vec!["Foo"]);

    handler.remove_from_network(&account, "Foo").unwrap();
    assert!(handler.get_apps(false).unwrap().is_empty());
    assert!(account.lock().unwrap().apps().is_empty());
    assert!(handler.remove_locally(&account, "Foo").unwrap_err().is_not_found());
}

#[test]
fn test_operations_before_initialise() {
    let account = fresh_account();
    let handler = AppHandler::new();
    let err = handler
        .add_or_link_app(&account, "Foo", "/x", "", Some(vec![]), false)
        .unwrap_err();
    assert!(matches!(
        err,
        safe_launcher::Error::App(AppError::NotInitialised)
    ));
    assert!(handler.get_snapshot(&account).is_err());
    assert!(handler.config_file_path().is_err());
}
