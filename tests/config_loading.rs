//! Integration test: Configuration utilities
//!
//! Tests the bin_common configuration loading functionality.

use linkwire_tools::bin_common::{load_config_from_env, load_settings, ConfigType};
use std::env;
use std::io::Write;
use std::time::Duration;

#[test]
fn test_connection_config_default() {
    // Clear env var to test default
    env::remove_var("LINKWIRE_CONFIG_PATH");

    let config_path = load_config_from_env(ConfigType::Connection);
    assert_eq!(config_path.to_str().unwrap(), "config/linkwire.yaml");
}

#[test]
fn test_custom_config() {
    let custom = ConfigType::Custom("custom/path.yaml".to_string());
    let config_path = load_config_from_env(custom);

    assert_eq!(config_path.to_str().unwrap(), "custom/path.yaml");
}

#[test]
fn test_missing_file_uses_defaults() {
    let path = env::temp_dir().join("linkwire-tools-does-not-exist.yaml");
    let settings = load_settings(&path).unwrap();

    assert_eq!(settings.connect_timeout(), Duration::from_secs(10));
    assert!(settings.handshake);
}

#[test]
fn test_settings_file_is_read() {
    let path = env::temp_dir().join(format!("linkwire-tools-{}.yaml", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "connect_timeout_ms: 1500").unwrap();
    writeln!(file, "handshake: false").unwrap();
    drop(file);

    let settings = load_settings(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(settings.connect_timeout(), Duration::from_millis(1500));
    assert!(!settings.handshake);
}

#[test]
fn test_invalid_settings_file_is_error() {
    let path = env::temp_dir().join(format!("linkwire-tools-bad-{}.yaml", std::process::id()));
    std::fs::write(&path, "receive_buffer_size: 0\n").unwrap();

    let result = load_settings(&path);
    std::fs::remove_file(&path).unwrap();

    assert!(result.is_err());
}
