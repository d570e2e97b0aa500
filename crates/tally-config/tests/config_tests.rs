use std::fs;

use chrono::Duration;
use tally_config::{Config, ConfigError, ConfigManager};
use tempfile::tempdir;

#[test]
fn default_config_matches_engine_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.due_window().expect("window"), Duration::hours(24));
    assert_eq!(cfg.recurrence_span().expect("span"), Duration::days(365));
    assert!(cfg.resolve_data_path().ends_with("tally/tally.json"));
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));

    assert_eq!(manager.load().expect("load config"), Config::default());
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().join("tally")).expect("manager");

    let cfg = Config {
        data_path: Some(dir.path().join("store.json")),
        due_window_hours: 48,
        log_filter: Some("tally=debug".into()),
        ..Config::default()
    };

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert_eq!(loaded.resolve_data_path(), dir.path().join("store.json"));
}

#[test]
fn partial_file_fills_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "due_window_hours": 6 }"#).expect("write config");

    let loaded = ConfigManager::new(path).load().expect("load config");
    assert_eq!(loaded.due_window_hours, 6);
    assert_eq!(loaded.default_recurrence_span_days, 365);
}

#[test]
fn invalid_values_are_rejected() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "default_recurrence_span_days": 0 }"#).expect("write config");

    let err = ConfigManager::new(path).load().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn oversized_windows_are_rejected_at_load() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");

    fs::write(&path, r#"{ "due_window_hours": 9223372036854775807 }"#).expect("write config");
    let err = ConfigManager::new(path.clone()).load().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    fs::write(&path, r#"{ "default_recurrence_span_days": 9223372036854775807 }"#)
        .expect("write config");
    let err = ConfigManager::new(path).load().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn unvalidated_config_reports_out_of_range_durations() {
    let cfg = Config {
        due_window_hours: i64::MAX,
        default_recurrence_span_days: i64::MAX,
        ..Config::default()
    };

    assert!(matches!(cfg.due_window(), Err(ConfigError::Invalid(_))));
    assert!(matches!(cfg.recurrence_span(), Err(ConfigError::Invalid(_))));
}

#[test]
fn save_leaves_no_staging_file() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("nested").join("config.json"));

    manager.save(&Config::default()).expect("save config");

    assert!(manager.config_path().exists());
    assert!(!tally_config::atomic::tmp_path(manager.config_path()).exists());
}
