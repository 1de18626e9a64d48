// Config loading and validation tests

use pfmon::config::{AppConfig, MAX_EXPIRY_HOURS};
use std::path::Path;

const VALID_CONFIG: &str = r#"
[general]
poll_interval_secs = 10
status_output = "out/status.json"

[session]
auth_file = "data/auth.json"
expiry_hours = 1

[bandwidth]
interfaces = ["wan", "lan", "opt1"]

[bandwidth.manual_ceilings]
wan = 500.0

[[targets]]
name = "primary"
url = "https://10.0.0.1"
username = "admin"
password = "secret"

[[targets]]
name = "backup"
url = "https://10.0.0.2"
username = "admin"
password = "secret"
timeout_secs = 5
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.general.poll_interval_secs, 10);
    assert_eq!(config.session.expiry_hours, 1);
    assert_eq!(config.bandwidth.interfaces, vec!["wan", "lan", "opt1"]);
    assert_eq!(config.bandwidth.manual_ceilings.get("wan"), Some(&500.0));
    assert_eq!(config.targets.len(), 2);
    assert_eq!(config.targets[0].name, "primary");
    assert_eq!(config.targets[1].timeout_secs, 5);
}

#[test]
fn test_config_defaults() {
    let config = AppConfig::load_from_str(VALID_CONFIG).unwrap();
    assert_eq!(config.general.data_dir, Path::new("data"));
    assert_eq!(config.bandwidth.ceiling_floor_mbps, 1000.0);
    assert_eq!(config.bandwidth.implausible_mbps, 20_000.0);
    assert_eq!(config.bandwidth.history_retention_secs, 300);
    assert_eq!(config.bandwidth.history_max_entries, 100);
    assert_eq!(config.bandwidth.interface_refresh_secs, 300);
    assert_eq!(config.targets[0].timeout_secs, 30);
    assert!(config.bandwidth.interface_names.is_empty());
}

#[test]
fn test_config_derived_paths() {
    let config = AppConfig::load_from_str(VALID_CONFIG).unwrap();
    assert_eq!(
        config.general.history_file(),
        Path::new("data").join("bandwidth_history.json")
    );
    assert_eq!(
        config.general.monitor_file(),
        Path::new("data").join("pfsense_monitor_data.json")
    );
    let policy = config.bandwidth.retention_policy();
    assert_eq!(policy.window_secs, 300);
    assert_eq!(policy.max_entries, 100);
}

#[test]
fn test_config_validation_rejects_zero_poll_interval() {
    let bad = VALID_CONFIG.replace("poll_interval_secs = 10", "poll_interval_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("poll_interval_secs"));
}

#[test]
fn test_config_validation_rejects_zero_expiry() {
    let bad = VALID_CONFIG.replace("expiry_hours = 1", "expiry_hours = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("expiry_hours"));
}

#[test]
fn test_config_validation_bounds_expiry_to_a_year() {
    let max = VALID_CONFIG.replace("expiry_hours = 1", &format!("expiry_hours = {MAX_EXPIRY_HOURS}"));
    assert!(AppConfig::load_from_str(&max).is_ok());

    for hours in [MAX_EXPIRY_HOURS + 1, u32::MAX] {
        let bad = VALID_CONFIG.replace("expiry_hours = 1", &format!("expiry_hours = {hours}"));
        let err = AppConfig::load_from_str(&bad).unwrap_err();
        assert!(err.to_string().contains("session.expiry_hours"), "{err}");
    }
}

#[test]
fn test_config_validation_rejects_no_interfaces() {
    let bad = VALID_CONFIG.replace(r#"interfaces = ["wan", "lan", "opt1"]"#, "interfaces = []");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("bandwidth.interfaces"));
}

#[test]
fn test_config_validation_rejects_non_positive_manual_ceiling() {
    let bad = VALID_CONFIG.replace("wan = 500.0", "wan = 0.0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("manual_ceilings.wan"));
}

#[test]
fn test_config_validation_rejects_duplicate_target_names() {
    let bad = VALID_CONFIG.replace(r#"name = "backup""#, r#"name = "primary""#);
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("unique"));
}

#[test]
fn test_config_validation_rejects_empty_url() {
    let bad = VALID_CONFIG.replace(r#"url = "https://10.0.0.2""#, r#"url = """#);
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("targets.url"));
}

#[test]
fn test_config_validation_rejects_zero_history_entries() {
    let bad = VALID_CONFIG.replace(
        r#"interfaces = ["wan", "lan", "opt1"]"#,
        "interfaces = [\"wan\"]\nhistory_max_entries = 0",
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("history_max_entries"));
}

#[test]
fn test_config_rejects_missing_section() {
    let bad = VALID_CONFIG.replace("[session]", "[sessions]");
    assert!(AppConfig::load_from_str(&bad).is_err());
}

#[test]
fn test_config_load_from_missing_path() {
    let err = AppConfig::load_from_path("/nonexistent/pfmon.toml").unwrap_err();
    assert!(err.to_string().contains("reading config"));
}

#[cfg(unix)]
#[test]
fn test_config_load_from_non_utf8_path() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::TempDir::new().unwrap();
    let nested = dir.path().join(OsStr::from_bytes(b"conf-\xff"));
    std::fs::create_dir(&nested).unwrap();
    let path = nested.join("pfmon.toml");
    std::fs::write(&path, VALID_CONFIG).unwrap();

    let config = AppConfig::load_from_path(&path).unwrap();
    assert_eq!(config.targets.len(), 2);
}
