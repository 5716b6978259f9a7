//! Launcher calls from several threads at once

use std::thread;

use safe_launcher::Launcher;

use super::helpers::*;

const ADDS: usize = 60;

fn app_name(thread: usize, i: usize) -> String {
    format!("App{thread}-{i:03}")
}

fn add_many(launcher: &Launcher, thread: usize, count: usize) {
    for i in 0..count {
        add(launcher, &app_name(thread, i));
    }
}

#[test]
fn test_failed_calls_keep_concurrent_successes() {
    let machine = Machine::new();
    let launcher = machine.create_account();

    thread::scope(|s| {
        s.spawn(|| add_many(&launcher, 0, ADDS));
        s.spawn(|| {
            for _ in 0..ADDS * 3 {
                assert!(launcher.update_app_name("Missing", "Other").is_err());
                assert!(launcher.remove_app_locally("Missing").is_err());
                assert!(launcher.remove_app_from_network("Missing").is_err());
            }
        });
    });

    assert_eq!(launcher.get_apps(true).unwrap().len(), ADDS);
    assert_eq!(launcher.account_apps().len(), ADDS);

    // The config file holds every add too.
    launcher.save_session(false).unwrap();
    let reloaded = machine.login();
    assert_eq!(reloaded.get_apps(true).unwrap().len(), ADDS);
    assert!(reloaded.get_apps(false).unwrap().is_empty());
}

#[test]
fn test_concurrent_mutations_saves_and_reads_finish() {
    let machine = Machine::new();
    let launcher = machine.create_account();

    thread::scope(|s| {
        for t in 0..2 {
            let launcher = &launcher;
            s.spawn(move || add_many(launcher, t, ADDS / 2));
        }
        s.spawn(|| {
            for _ in 0..5 {
                launcher.save_session(true).unwrap();
            }
        });
        s.spawn(|| {
            for _ in 0..ADDS {
                let local = launcher.get_apps(true).unwrap();
                assert!(local.len() <= launcher.account_apps().len());
                let _ = launcher.has_unsaved_changes();
            }
        });
    });

    assert_eq!(launcher.account_apps().len(), ADDS);
    launcher.save_session(false).unwrap();
    assert!(!launcher.has_unsaved_changes());

    let other = machine.other().login();
    assert_eq!(other.get_apps(false).unwrap().len(), ADDS);
}

#[test]
fn test_revert_undoes_every_concurrent_change() {
    let machine = Machine::new();
    let launcher = machine.create_account();
    launcher.save_session(true).unwrap();

    thread::scope(|s| {
        for t in 0..3 {
            let launcher = &launcher;
            s.spawn(move || add_many(launcher, t, ADDS / 3));
        }
    });
    assert_eq!(launcher.account_apps().len(), ADDS);

    launcher.revert_to_last_saved_session().unwrap();
    assert!(launcher.account_apps().is_empty());
    assert!(launcher.get_apps(true).unwrap().is_empty());
    assert!(!machine.config_path().exists());
}
