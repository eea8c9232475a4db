//! Tests for configuration loading and root folder resolution
//!
//! Tests that touch SCRIBE_* environment variables are marked #[serial]
//! so they never run in parallel.

use scribe_common::config::{
    default_root_folder, load_toml_config, load_toml_config_from, resolve_secret,
    RootFolderInitializer, RootFolderResolver, TomlConfig, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root_folder = RootFolderResolver::new("scribe-test-module-without-config").resolve();
    assert_eq!(root_folder, default_root_folder());
}

#[test]
#[serial]
fn test_resolver_env_var() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/scribe-test-env-folder");

    let root_folder = RootFolderResolver::new("scribe-test").resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/scribe-test-env-folder"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_cli_beats_env() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/from-env");

    let root_folder = RootFolderResolver::new("scribe-test")
        .with_cli_arg(Some(PathBuf::from("/tmp/from-cli")))
        .resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/from-cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_blank_env_is_ignored() {
    env::set_var(ROOT_FOLDER_ENV, "   ");

    let root_folder = RootFolderResolver::new("scribe-test-module-without-config").resolve();
    assert_eq!(root_folder, default_root_folder());

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
fn test_initializer_creates_directory() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("nested").join("scribe");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert_eq!(initializer.database_path(), root.join("scribe.db"));
}

#[test]
fn test_missing_config_file_yields_defaults() {
    let config = load_toml_config("scribe-test-module-without-config").unwrap();
    assert!(config.root_folder.is_none());
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.ai.model, "google/gemini-2.5-flash");
    assert_eq!(config.ai.abstract_model, "gpt-4o-mini");
    assert_eq!(config.ai.abstract_max_words, 500);
}

#[test]
fn test_partial_toml_fills_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
root_folder = "/srv/scribe"
port = 6000

[ai]
api_key = "sk-test"
requests_per_second = 2
"#
    )
    .unwrap();

    let config = load_toml_config_from(file.path()).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/scribe")));
    assert_eq!(config.port, Some(6000));
    assert_eq!(config.ai.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.ai.requests_per_second, 2);
    assert_eq!(
        config.ai.gateway_url,
        "https://ai.gateway.lovable.dev/v1/chat/completions"
    );
    assert_eq!(config.ai_service.url, "http://127.0.0.1:5741");
    assert!(config.ai_service.service_key.is_none());
}

#[test]
fn test_invalid_toml_is_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = \"not a number\"").unwrap();

    let err = load_toml_config_from(file.path()).unwrap_err();
    assert!(matches!(err, scribe_common::Error::Config(_)));
}

#[test]
fn test_toml_config_round_trips() {
    let mut config = TomlConfig::default();
    config.ai_service.service_key = Some("shared".to_string());
    let text = toml::to_string(&config).unwrap();
    let parsed: TomlConfig = toml::from_str(&text).unwrap();
    assert_eq!(parsed.ai_service.service_key.as_deref(), Some("shared"));
}

#[test]
#[serial]
fn test_secret_env_wins_over_toml() {
    env::set_var("SCRIBE_TEST_SECRET", "from-env");
    assert_eq!(
        resolve_secret("Test secret", "SCRIBE_TEST_SECRET", Some("from-toml")).as_deref(),
        Some("from-env")
    );
    env::remove_var("SCRIBE_TEST_SECRET");
}

#[test]
#[serial]
fn test_secret_falls_back_to_toml() {
    env::remove_var("SCRIBE_TEST_SECRET");
    assert_eq!(
        resolve_secret("Test secret", "SCRIBE_TEST_SECRET", Some("from-toml")).as_deref(),
        Some("from-toml")
    );
}

#[test]
#[serial]
fn test_blank_secrets_are_unset() {
    env::set_var("SCRIBE_TEST_SECRET", "");
    assert!(resolve_secret("Test secret", "SCRIBE_TEST_SECRET", Some("  ")).is_none());
    env::remove_var("SCRIBE_TEST_SECRET");
}
