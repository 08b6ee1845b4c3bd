//! Configuration resolution: file, environment overrides, validation

use fleetkeeper::config::{FleetConfig, CONFIG_ENV, REGISTRY_ENV, STATE_DIR_ENV};
use serial_test::serial;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_env() {
    std::env::remove_var(CONFIG_ENV);
    std::env::remove_var(REGISTRY_ENV);
    std::env::remove_var(STATE_DIR_ENV);
}

#[test]
#[serial]
fn test_load_defaults_without_file() {
    clear_env();
    let config = FleetConfig::load(None).unwrap();
    assert_eq!(
        config.registry_path,
        PathBuf::from("/etc/fleetkeeper/registry.yml")
    );
    assert_eq!(
        config.alerts_log_path(),
        PathBuf::from("/var/log/fleetkeeper/alerts.log")
    );
}

#[test]
#[serial]
fn test_explicit_file_then_env_overrides() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fleetkeeper.toml");
    std::fs::write(
        &path,
        r#"
registry_path = "/srv/registry.yml"
state_dir = "/srv/state"
audit_log = "/srv/audit/bridge.log"

[telemetry]
alert_threshold = 0.9
"#,
    )
    .unwrap();

    std::env::set_var(STATE_DIR_ENV, "/tmp/fleet-state");
    let config = FleetConfig::load(Some(&path)).unwrap();
    clear_env();

    assert_eq!(config.registry_path, PathBuf::from("/srv/registry.yml"));
    assert_eq!(config.state_dir, PathBuf::from("/tmp/fleet-state"));
    assert_eq!(config.audit_log_path(), PathBuf::from("/srv/audit/bridge.log"));
    assert_eq!(
        config.usage_history_path(),
        PathBuf::from("/tmp/fleet-state/usage_log.json")
    );
    assert_eq!(config.telemetry.alert_threshold, 0.9);
}

#[test]
#[serial]
fn test_config_file_from_environment() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fleetkeeper.toml");
    std::fs::write(&path, "registry_path = \"/opt/apps.yml\"\n").unwrap();

    std::env::set_var(CONFIG_ENV, &path);
    std::env::set_var(REGISTRY_ENV, "/override/apps.yml");
    let config = FleetConfig::load(None).unwrap();
    clear_env();

    assert_eq!(config.registry_path, PathBuf::from("/override/apps.yml"));
}

#[test]
#[serial]
fn test_invalid_file_is_rejected() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fleetkeeper.toml");
    std::fs::write(&path, "[integrity]\nhigh_load_memory_percent = 250.0\n").unwrap();

    assert!(FleetConfig::load(Some(&path)).is_err());
    assert!(FleetConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
}
