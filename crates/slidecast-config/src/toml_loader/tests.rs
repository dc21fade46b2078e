//! Tests for TOML config loading, creation, and path resolution.

use super::*;
use std::path::Path;

#[test]
fn load_from_nonexistent_returns_parse_error() {
    let result = load_from_path(Path::new("/tmp/nonexistent_slidecast_config.toml"));
    let err = result.unwrap_err();
    assert!(matches!(err, slidecast_common::ConfigError::ParseError(_)));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[server]
port = 9000

[hub]
drop_after_overflows = 3
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.hub.drop_after_overflows, 3);
    // Defaults preserved
    assert_eq!(config.server.bind_address, "0.0.0.0");
    assert_eq!(config.hub.comment_buffer, 10);
    assert_eq!(config.connection.ping_interval_secs, 54);
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, slidecast_common::ConfigError::ParseError(_)));
}

#[test]
fn load_config_with_invalid_values_is_returned_as_parsed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[connection]\nwrite_timeout_secs = 0\n").unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.connection.write_timeout_secs, 0);
}

#[test]
fn log_level_parses_lowercase() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.logging.level, crate::schema::LogLevel::Debug);
    assert_eq!(config.logging.level.as_directive(), "debug");
}

#[test]
fn create_and_load_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slidecast").join("config.toml");

    create_default_config(&path).unwrap();
    assert!(path.exists());

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.server.port, 8080);
    assert!(!config.audit.enabled);
}

#[test]
fn create_default_config_keeps_an_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[server]\nport = 9100\n").unwrap();

    create_default_config(&path).unwrap();

    assert_eq!(load_from_path(&path).unwrap().server.port, 9100);
}

#[test]
fn default_config_toml_is_valid() {
    use super::template::default_config_toml;
    use crate::schema::SlidecastConfig;

    let config: SlidecastConfig = toml::from_str(default_config_toml()).unwrap();
    assert!(crate::validation::validate(&config).is_ok());
}

#[test]
fn default_config_path_is_reasonable() {
    if let Ok(path) = default_config_path() {
        let path_str = path.to_string_lossy();
        assert!(path_str.contains("slidecast"));
        assert!(path_str.ends_with("config.toml"));
    }
}
