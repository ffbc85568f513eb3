//! BDD-style scenarios for config file discovery and loading.

use std::fs;

use ktmetrics_settings::{CONFIG_FILE_NAME, NoavMode, Settings, SettingsError, TomlConfig};
use tempfile::TempDir;

#[test]
fn scenario_config_discovered_in_scan_root() {
    // Given a project directory with a ktmetrics.toml
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), "noav = \"broad\"\n").unwrap();

    // When I look for a config file from that root
    let found = TomlConfig::discover(dir.path()).expect("config should be found");

    // Then it loads and overlays onto defaults
    let cfg = TomlConfig::from_file(&found).unwrap();
    let settings = cfg.overlay(Settings::default());
    assert_eq!(settings.analysis.noav, NoavMode::Broad);
}

#[test]
fn scenario_config_discovered_next_to_file_root() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("Main.kt");
    fs::write(&file, "fun main() {}\n").unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), "max_files = 3\n").unwrap();

    let found = TomlConfig::discover(&file).unwrap();
    assert_eq!(found, dir.path().join(CONFIG_FILE_NAME));
}

#[test]
fn scenario_no_config_file() {
    // Given an empty directory
    let dir = TempDir::new().unwrap();

    // Then no config is discovered
    assert!(TomlConfig::discover(dir.path()).is_none());
}

#[test]
fn scenario_missing_file_is_read_error() {
    let dir = TempDir::new().unwrap();
    let err = TomlConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, SettingsError::Read { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn scenario_malformed_file_is_parse_error() {
    // Given a config file with a syntax error
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    fs::write(&path, "format = \n").unwrap();

    // When I load it
    let err = TomlConfig::from_file(&path).unwrap_err();

    // Then the error names the file and keeps the TOML cause
    assert!(matches!(err, SettingsError::Parse { .. }));
    assert!(std::error::Error::source(&err).is_some());
}
