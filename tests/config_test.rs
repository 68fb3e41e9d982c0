//! Integration tests for Settings layered loading
//!
//! Note: These tests run without a global config (temp directories only),
//! so they test local config merging over defaults.

use std::fs;

use tempfile::TempDir;

use skillmix::config::{local_config_path, Settings};

#[test]
fn given_data_dir_without_local_config_when_load_then_uses_defaults_with_that_dir() {
    // Arrange
    let data_dir = TempDir::new().unwrap();

    // Act
    let settings = Settings::load(Some(data_dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings.data_dir, data_dir.path());
    assert_eq!(settings.combine.preview_limit, 10);
}

#[test]
fn given_local_config_when_load_then_overrides_specified_fields_only() {
    // Arrange
    let data_dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(data_dir.path()),
        r#"
[combine]
preview_limit = 3
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(data_dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings.combine.preview_limit, 3);
    assert_eq!(settings.data_dir, data_dir.path());
}

#[test]
fn given_malformed_local_config_when_load_then_config_error() {
    // Arrange
    let data_dir = TempDir::new().unwrap();
    fs::write(local_config_path(data_dir.path()), "combine = [").unwrap();

    // Act
    let result = Settings::load(Some(data_dir.path()));

    // Assert
    assert!(matches!(
        result,
        Err(skillmix::application::ApplicationError::Config { .. })
    ));
}

#[test]
fn given_env_override_when_load_then_env_wins() {
    // Arrange
    let data_dir = TempDir::new().unwrap();
    std::env::set_var("SKILLMIX_OUTPUT__PRETTY", "false");

    // Act
    let settings = Settings::load(Some(data_dir.path()));
    std::env::remove_var("SKILLMIX_OUTPUT__PRETTY");

    // Assert
    assert!(!settings.expect("load settings").output.pretty);
}

#[test]
fn given_settings_when_rendered_to_toml_then_parses_back() {
    let data_dir = TempDir::new().unwrap();
    let settings = Settings::load(Some(data_dir.path())).unwrap();

    let text = settings.to_toml().unwrap();
    let parsed: Settings = toml::from_str(&text).unwrap();

    assert_eq!(parsed.combine, settings.combine);
    assert_eq!(parsed.data_dir, settings.data_dir);
}
