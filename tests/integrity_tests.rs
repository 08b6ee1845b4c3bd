//! Integrity verification and fix-mode self-healing

mod common;
use common::*;

use fleetkeeper::integrity::{
    entry_stub, exit_status, HealthSnapshot, HealthStatus, IntegrityChecker,
};
use fleetkeeper::registry::{RegistryError, RegistrySource};
use std::path::PathBuf;

fn checker(fleet: &TempFleet, memory_percent: f64) -> IntegrityChecker {
    IntegrityChecker::new(
        RegistrySource::new(fleet.registry_path()),
        snapshot_path(fleet),
        85.0,
        FixedProbe::boxed(12.5, memory_percent),
    )
}

fn snapshot_path(fleet: &TempFleet) -> PathBuf {
    fleet.root().join("state").join("summary.json")
}

fn single_app_registry(fleet: &TempFleet, dir: &std::path::Path) {
    fleet.write_registry(&format!(
        "alpha:\n  path: {}\n  entry: main.py\n  systemd: true\n",
        dir.display()
    ));
}

#[test]
fn test_missing_dir_without_fix_is_one_error() {
    let fleet = TempFleet::new();
    let dir = fleet.root().join("alpha");
    single_app_registry(&fleet, &dir);

    let report = checker(&fleet, 40.0).verify(false).unwrap();

    assert_eq!(
        report.errors,
        vec![format!("alpha: missing dir {}", dir.display())]
    );
    assert!(report.warnings.is_empty());
    assert!(report.ok.is_empty());
    assert!(!dir.exists());
    assert!(report.snapshot.is_none());
    assert!(!snapshot_path(&fleet).exists());
}

#[test]
fn test_fix_creates_dir_entry_and_snapshot() {
    let fleet = TempFleet::new();
    let dir = fleet.root().join("alpha");
    single_app_registry(&fleet, &dir);

    let report = checker(&fleet, 40.0).verify(true).unwrap();

    assert_eq!(
        report.warnings,
        vec![
            format!("alpha: created {}", dir.display()),
            "alpha: created entry main.py".to_string(),
        ]
    );
    assert!(report.errors.is_empty());
    assert!(dir.is_dir());
    assert_eq!(
        std::fs::read_to_string(dir.join("main.py")).unwrap(),
        entry_stub("alpha")
    );

    let written = HealthSnapshot::read_from(&snapshot_path(&fleet)).unwrap();
    assert_eq!(written.active_apps, vec!["alpha"]);
    assert_eq!(written.server_health.cpu, 12.5);
    assert_eq!(written.server_health.status, HealthStatus::Healthy);
    assert_eq!(written.alerts.len(), 2);
    assert!(written.alerts[0].starts_with("Integrity check executed successfully at "));
    assert_eq!(written.alerts[1], "2 warnings, 0 errors");
    assert_eq!(report.snapshot, Some(written));
    assert_eq!(report.snapshot_path, Some(snapshot_path(&fleet)));
}

#[test]
fn test_fix_overwrites_existing_entry() {
    let fleet = TempFleet::new();
    let dir = fleet.app_dir("alpha", "main.py");
    single_app_registry(&fleet, &dir);

    let report = checker(&fleet, 40.0).verify(true).unwrap();

    assert_eq!(report.warnings, vec!["alpha: created entry main.py"]);
    assert_eq!(
        std::fs::read_to_string(dir.join("main.py")).unwrap(),
        entry_stub("alpha")
    );
}

#[test]
fn test_clean_registry() {
    let fleet = TempFleet::new();
    let dir = fleet.app_dir("alpha", "main.py");
    single_app_registry(&fleet, &dir);

    let report = checker(&fleet, 40.0).verify(false).unwrap();

    assert!(report.is_clean());
    assert_eq!(report.ok, vec!["alpha"]);
    assert_eq!(report.lines(), vec!["All applications verified clean."]);
}

#[test]
fn test_missing_entry_without_fix() {
    let fleet = TempFleet::new();
    let dir = fleet.root().join("alpha");
    std::fs::create_dir_all(&dir).unwrap();
    single_app_registry(&fleet, &dir);

    let report = checker(&fleet, 40.0).verify(false).unwrap();

    assert_eq!(report.errors, vec!["alpha: missing entry main.py"]);
    assert_eq!(report.lines(), vec!["ERROR alpha: missing entry main.py"]);
}

#[test]
fn test_bad_record_is_reported_and_others_continue() {
    let fleet = TempFleet::new();
    let gamma = fleet.app_dir("gamma", "run.py");
    fleet.write_registry(&format!(
        "beta:\n  path: /srv/beta\ngamma:\n  path: {}\n  entry: run.py\n",
        gamma.display()
    ));

    let report = checker(&fleet, 40.0).verify(false).unwrap();

    assert_eq!(report.errors, vec!["beta: bad record"]);
    assert_eq!(report.ok, vec!["gamma"]);
}

#[test]
fn test_high_load_snapshot() {
    let fleet = TempFleet::new();
    let dir = fleet.app_dir("alpha", "main.py");
    single_app_registry(&fleet, &dir);

    checker(&fleet, 91.0).verify(true).unwrap();

    let raw = std::fs::read_to_string(snapshot_path(&fleet)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["server_health"]["status"], "High Load");
    assert_eq!(json["server_health"]["memory"], 91.0);
    assert_eq!(json["active_apps"][0], "alpha");
}

#[test]
fn test_missing_registry_fails_before_anything() {
    let fleet = TempFleet::new();

    let result = checker(&fleet, 40.0).verify(true);

    assert!(matches!(result, Err(RegistryError::SourceMissing(_))));
    assert_eq!(exit_status(&result), 2);
    assert!(!snapshot_path(&fleet).exists());
}

#[test]
fn test_unparsable_registry_exit_status() {
    let fleet = TempFleet::new();
    fleet.write_registry("- just\n- a list\n");

    let result = checker(&fleet, 40.0).verify(false);

    assert!(matches!(result, Err(RegistryError::Parse(_))));
    assert_eq!(exit_status(&result), 1);
}

#[test]
fn test_warnings_do_not_change_exit_status() {
    let fleet = TempFleet::new();
    let dir = fleet.root().join("alpha");
    single_app_registry(&fleet, &dir);

    let result = checker(&fleet, 40.0).verify(true);

    assert!(!result.as_ref().unwrap().is_clean());
    assert_eq!(exit_status(&result), 0);
}

#[test]
fn test_fix_heals_self_managed_app_from_scratch() {
    let fleet = TempFleet::new();
    let dir = fleet.root().join("x");
    fleet.write_registry(&format!(
        "alpha:\n  path: {}\n  entry: run.py\n  backend: self-managed\n",
        dir.display()
    ));

    let report = checker(&fleet, 40.0).verify(true).unwrap();

    assert_eq!(report.warnings.len(), 2);
    assert!(dir.is_dir());
    let stub = std::fs::read_to_string(dir.join("run.py")).unwrap();
    assert!(stub.contains("alpha"));
    assert_eq!(report.snapshot.unwrap().active_apps, vec!["alpha"]);
}
