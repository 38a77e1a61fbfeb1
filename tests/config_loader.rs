use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use statehouse::config::{Config, ConfigError};

fn write_config(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.toml");
    fs::write(&path, content).expect("Failed to write config");
    (dir, path)
}

/// Test that Config::default() produces the expected values.
#[test]
fn test_config_default_values() {
    let config = Config::default();
    assert_eq!(config.api.auth_url, "https://identitytoolkit.googleapis.com/v1");
    assert_eq!(config.logging.filter, "warn");
    assert_eq!(config.effects.timeout_seconds, 30);
    assert!(config.storage.session_path.ends_with("statehouse/session.json"));
    assert!(config.storage.state_path.ends_with("statehouse/state.json"));
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_path_ends_with_expected() {
    assert!(Config::config_path().ends_with("statehouse/config.toml"));
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.effects, Config::default().effects);
}

/// Test that partial files fill the remaining fields from defaults.
#[test]
fn test_partial_file_merges_defaults() {
    let (_dir, path) = write_config(
        r#"
[api]
recipes_url = "https://recipes.example.com"

[storage]
state_path = "/tmp/statehouse-state.json"

[effects]
timeout_seconds = 5
"#,
    );
    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.api.recipes_url, "https://recipes.example.com");
    assert_eq!(config.api.auth_url, Config::default().api.auth_url);
    assert_eq!(config.storage.state_path, PathBuf::from("/tmp/statehouse-state.json"));
    assert_eq!(config.effects.timeout_seconds, 5);
    assert_eq!(config.logging.filter, "warn");
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let (_dir, path) = write_config("[api\nrecipes_url = ");
    assert!(matches!(
        Config::load_from(&path),
        Err(ConfigError::ParseError { .. })
    ));
}

#[test]
fn test_invalid_url_fails_validation() {
    let (_dir, path) = write_config("[api]\nauth_url = \"not a url\"\n");
    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }));
    assert!(err.to_string().contains("api.auth_url"));
}

#[test]
fn test_zero_timeout_fails_validation() {
    let mut config = Config::default();
    config.effects.timeout_seconds = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValidationError { .. })
    ));
}

#[test]
fn test_unreadable_path_is_read_error() {
    let dir = TempDir::new().unwrap();
    // A directory exists but cannot be read as a file.
    assert!(matches!(
        Config::load_from(dir.path()),
        Err(ConfigError::ReadError { .. })
    ));
}
