//! # Configuration Tests
//!
//! Tests for the layered configuration loading: programmatic defaults, YAML
//! parsing with `${VAR}` substitution, and prefixed environment overrides.

use nexusone_server::config::{get_config, ConfigError};
use std::env;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Environment variables are a shared, global resource; tests that touch them
// must run sequentially.
static ENV_LOCK: Mutex<()> = Mutex::new(());

const MINIMAL_CONFIG: &str = r#"
extraction:
  api_url: "http://localhost:7000/extract"
providers:
  default:
    provider: "local"
    api_url: "http://localhost:1234/v1/chat/completions"
    api_key: null
    model_name: "test-model"
"#;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp config file");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

#[test]
fn test_minimal_config_gets_programmatic_defaults() {
    let _lock = ENV_LOCK.lock().unwrap();
    let file = write_config(MINIMAL_CONFIG);

    let config = get_config(file.path().to_str()).expect("config should load");

    assert_eq!(config.port, 8080);
    assert_eq!(config.db_url, "db/nexusone.db");
    assert_eq!(config.extraction.timeout_secs, 30);
    assert_eq!(config.upload.max_size_bytes, 10 * 1024 * 1024);

    // The chat task is fully resolved from library defaults.
    let chat = config.tasks.get("chat").expect("default chat task");
    assert_eq!(chat.provider.as_deref(), Some("default"));
    assert!(chat
        .system_prompt
        .as_deref()
        .unwrap()
        .contains("onboarding assistant"));
    assert!(chat.user_prompt.as_deref().unwrap().contains("{message}"));

    // Relevance tables default to the stock keyword sets.
    assert!(config
        .relevance
        .policy_triggers
        .iter()
        .any(|t| t == "handbook"));
    assert!(config.relevance.topics.contains_key("benefits"));
}

#[test]
fn test_yaml_values_override_defaults() {
    let _lock = ENV_LOCK.lock().unwrap();
    let file = write_config(&format!(
        "{MINIMAL_CONFIG}\nport: 9999\ncontext:\n  max_file_chars: 500\n"
    ));

    let config = get_config(file.path().to_str()).expect("config should load");
    assert_eq!(config.port, 9999);
    assert_eq!(config.context.max_file_chars, 500);
    // Unspecified budget fields keep their defaults.
    assert_eq!(config.context.max_total_chars, 32_000);
}

#[test]
fn test_env_var_substitution_in_yaml() {
    let _lock = ENV_LOCK.lock().unwrap();
    env::set_var("TEST_EXTRACTION_URL", "http://substituted:9001/extract");
    let file = write_config(
        r#"
extraction:
  api_url: "${TEST_EXTRACTION_URL}"
providers:
  default:
    provider: "local"
    api_url: "http://localhost:1234"
    api_key: null
    model_name: "m"
"#,
    );

    let config = get_config(file.path().to_str()).expect("config should load");
    assert_eq!(config.extraction.api_url, "http://substituted:9001/extract");

    env::remove_var("TEST_EXTRACTION_URL");
}

#[test]
fn test_prefixed_env_overrides_nested_keys() {
    let _lock = ENV_LOCK.lock().unwrap();
    env::set_var("NEXUSONE_EXTRACTION__TIMEOUT_SECS", "7");
    let file = write_config(MINIMAL_CONFIG);

    let config = get_config(file.path().to_str()).expect("config should load");
    assert_eq!(config.extraction.timeout_secs, 7);

    env::remove_var("NEXUSONE_EXTRACTION__TIMEOUT_SECS");
}

#[test]
fn test_missing_config_file_is_not_found() {
    let _lock = ENV_LOCK.lock().unwrap();
    let result = get_config(Some("/nonexistent/config.yml"));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}
