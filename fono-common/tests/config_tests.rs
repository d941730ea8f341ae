//! Configuration resolution and graceful degradation
//!
//! Uses serial_test because several tests manipulate FONO_API_URL and
//! FONO_CONFIG; those are marked #[serial] so they never run in parallel.

use fono_common::config::{
    config_file_path, load_toml_config, CompiledDefaults, ConfigResolver, ENV_API_URL,
    ENV_CONFIG_PATH,
};
use serial_test::serial;
use std::env;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, content).unwrap();
    path
}

fn clear_env() {
    env::remove_var(ENV_API_URL);
    env::remove_var(ENV_CONFIG_PATH);
}

#[test]
fn test_compiled_defaults() {
    let defaults = CompiledDefaults::for_current_platform();
    assert_eq!(defaults.api_url, "http://localhost:5001");
    assert_eq!(defaults.timeout_secs, 30);
    assert_eq!(defaults.per_page, 20);
    assert_eq!(defaults.log_level, "info");
    assert!(defaults.log_file.is_none());
}

#[test]
#[serial]
fn test_missing_config_file_falls_back_to_defaults() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let config = ConfigResolver::new()
        .with_config_path(Some(missing))
        .resolve()
        .unwrap();

    assert_eq!(config.api_url, "http://localhost:5001");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.per_page, 20);
    assert_eq!(config.logging.level, "info");
}

#[test]
#[serial]
fn test_malformed_config_file_falls_back_to_defaults() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "api_url = [this is not toml");

    let config = ConfigResolver::new()
        .with_config_path(Some(path))
        .resolve()
        .unwrap();
    assert_eq!(config.api_url, "http://localhost:5001");
    assert_eq!(config.warnings.len(), 1);
    assert!(config.warnings[0].starts_with("Ignoring config file"));
}

#[test]
#[serial]
fn test_toml_values_are_used() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
api_url = "https://fonogramas.example.org/"
timeout_secs = 5
per_page = 50
download_dir = "/tmp/ecad"

[logging]
level = "debug"
"#,
    );

    let config = ConfigResolver::new()
        .with_config_path(Some(path))
        .resolve()
        .unwrap();

    assert_eq!(config.api_url, "https://fonogramas.example.org");
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(config.per_page, 50);
    assert_eq!(config.download_dir, std::path::PathBuf::from("/tmp/ecad"));
    assert_eq!(config.logging.level, "debug");
    assert!(config.warnings.is_empty());
}

#[test]
#[serial]
fn test_priority_cli_over_env_over_toml() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "api_url = \"http://from-toml:1\"");

    let toml_only = ConfigResolver::new()
        .with_config_path(Some(path.clone()))
        .resolve()
        .unwrap();
    assert_eq!(toml_only.api_url, "http://from-toml:1");

    env::set_var(ENV_API_URL, "http://from-env:2");
    let env_wins = ConfigResolver::new()
        .with_config_path(Some(path.clone()))
        .resolve()
        .unwrap();
    assert_eq!(env_wins.api_url, "http://from-env:2");

    let cli_wins = ConfigResolver::new()
        .with_api_url(Some("http://from-cli:3".to_string()))
        .with_config_path(Some(path))
        .resolve()
        .unwrap();
    assert_eq!(cli_wins.api_url, "http://from-cli:3");

    clear_env();
}

#[test]
#[serial]
fn test_env_config_path_is_honoured() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "per_page = 7");
    env::set_var(ENV_CONFIG_PATH, &path);

    assert_eq!(config_file_path(None), Some(path.clone()));
    let config = ConfigResolver::new().resolve().unwrap();
    assert_eq!(config.per_page, 7);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_api_url_is_an_error() {
    clear_env();
    let result = ConfigResolver::new()
        .with_api_url(Some("localhost:5001".to_string()))
        .resolve();
    assert!(result.is_err());
}

#[test]
fn test_load_toml_config_reports_read_failure() {
    let dir = TempDir::new().unwrap();
    let err = load_toml_config(&dir.path().join("missing.toml")).unwrap_err();
    assert!(err.to_string().contains("Read TOML failed"));
}
