use cargo_sweeper::config::Config;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn parse_complete_config_file() {
    let config_content = r#"
[cleaner]
cargo = "/opt/rust/bin/cargo"
offline_retry = false
release_retry = true
exclude = ["vendor", "third_party"]
follow_symlinks = true
"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(config_content.as_bytes()).unwrap();

    let config = Config::load(Some(file.path())).unwrap();

    assert_eq!(config.cleaner.cargo, "/opt/rust/bin/cargo");
    assert!(!config.cleaner.offline_retry);
    assert!(config.cleaner.release_retry);
    assert_eq!(config.cleaner.exclude, vec!["vendor", "third_party"]);
    assert!(config.cleaner.follow_symlinks);
}

#[test]
fn parse_partial_config_uses_defaults() {
    let config_content = r#"
[cleaner]
offline_retry = false
"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(config_content.as_bytes()).unwrap();

    let config = Config::load(Some(file.path())).unwrap();

    // Explicit value
    assert!(!config.cleaner.offline_retry);
    // Default values
    assert_eq!(config.cleaner.cargo, "cargo");
    assert!(config.cleaner.release_retry);
    assert!(config.cleaner.exclude.is_empty());
}

#[test]
fn parse_invalid_toml_returns_error() {
    let config_content = "this is not valid toml [[[";

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(config_content.as_bytes()).unwrap();

    let result = Config::load(Some(file.path()));
    assert!(result.is_err());
}

#[test]
fn parse_empty_cargo_returns_error() {
    let config_content = r#"
[cleaner]
cargo = ""
"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(config_content.as_bytes()).unwrap();

    let result = Config::load(Some(file.path()));
    assert!(result.is_err());
}

#[test]
fn missing_explicit_file_returns_error() {
    let result = Config::load(Some(std::path::Path::new("/nonexistent/cargo-sweeper.toml")));
    assert!(result.is_err());
}
