//! Tests for config functionality.

use crate::config::Config;
use crate::error::DetectError;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.registry_url, "https://registry.npmjs.org");
    assert_eq!(config.github_raw_url, "https://raw.githubusercontent.com");
    assert_eq!(config.github_api_url, "https://api.github.com");
    assert_eq!(config.node_dist_index_url, "https://nodejs.org/dist/index.json");
    assert!(config.node_schedule_url.ends_with("/schedule.json"));
    assert!(config.user_agent.starts_with("detect-node-support/"));
    assert_eq!(config.request_timeout_secs, 30);
    assert_eq!(config.github_token, None);
    assert_eq!(config.setup_node_actions, vec!["actions/setup-node"]);
    assert!(config.github_actions);
    assert!(config.validate().is_ok());
}

#[test]
fn test_parse_minimal_yaml() {
    let config = Config::from_yaml("").unwrap();

    // Should use all defaults
    assert_eq!(config.request_timeout_secs, 30);
    assert_eq!(config.registry_url, "https://registry.npmjs.org");
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
registry_url: https://registry.example.com
github_actions: false
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.registry_url, "https://registry.example.com");
    assert!(!config.github_actions);

    // Unspecified values should use defaults
    assert_eq!(config.github_api_url, "https://api.github.com");
    assert_eq!(config.setup_node_actions, vec!["actions/setup-node"]);
}

#[test]
fn test_parse_full_yaml() {
    let yaml = r#"
registry_url: http://localhost:4873
github_raw_url: https://raw.example.com
github_api_url: https://api.example.com
node_dist_index_url: https://mirror.example.com/dist/index.json
node_schedule_url: https://mirror.example.com/schedule.json
user_agent: "my-agent/1.0"
request_timeout_secs: 5
github_token: abc123
setup_node_actions:
  - actions/setup-node
  - my-org/setup-node
github_actions: true
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.registry_url, "http://localhost:4873");
    assert_eq!(config.github_raw_url, "https://raw.example.com");
    assert_eq!(config.user_agent, "my-agent/1.0");
    assert_eq!(config.request_timeout(), Duration::from_secs(5));
    assert_eq!(config.github_token.as_deref(), Some("abc123"));
    assert_eq!(config.setup_node_actions.len(), 2);
}

#[test]
fn test_unknown_fields_are_ignored() {
    let yaml = r#"
request_timeout_secs: 10
some_future_field: true
nested:
  also: ignored
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.request_timeout_secs, 10);
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_zero_timeout_is_rejected() {
    let err = Config::from_yaml("request_timeout_secs: 0").unwrap_err();
    assert!(matches!(err, DetectError::ConfigError(_)));
    assert!(err.to_string().contains("request_timeout_secs"));
}

#[test]
fn test_non_http_url_is_rejected() {
    let err = Config::from_yaml("registry_url: ftp://registry.example.com").unwrap_err();
    assert!(err.to_string().contains("registry_url"));
    assert!(err.to_string().contains("ftp://registry.example.com"));
}

#[test]
fn test_empty_setup_action_is_rejected() {
    let err = Config::from_yaml("setup_node_actions: [\"actions/setup-node\", \"\"]").unwrap_err();
    assert!(err.to_string().contains("setup_node_actions"));
}

#[test]
fn test_invalid_yaml_is_config_error() {
    let err = Config::from_yaml("request_timeout_secs: [").unwrap_err();
    assert!(matches!(err, DetectError::ConfigError(_)));
}

#[test]
fn test_wrong_type_is_config_error() {
    let err = Config::from_yaml("request_timeout_secs: soon").unwrap_err();
    assert!(err.to_string().starts_with("failed to parse config YAML"));
}

// ============================================================================
// Loading and serialization
// ============================================================================

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "request_timeout_secs: 12\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.request_timeout_secs, 12);
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = Config::load(dir.path().join("missing.yaml")).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn test_yaml_roundtrip() {
    let mut config = Config::default();
    config.request_timeout_secs = 7;
    config.setup_node_actions.push("my-org/setup-node".to_string());

    let parsed = Config::from_yaml(&config.to_yaml().unwrap()).unwrap();
    assert_eq!(parsed.request_timeout_secs, 7);
    assert_eq!(parsed.setup_node_actions, config.setup_node_actions);
}

#[test]
fn test_github_token_precedence() {
    let mut config = Config::default();
    assert_eq!(config.github_token_with(None), None);

    config.github_token = Some("from-config".to_string());
    assert_eq!(config.github_token_with(None).as_deref(), Some("from-config"));
    assert_eq!(
        config.github_token_with(Some("from-env".to_string())).as_deref(),
        Some("from-env")
    );
    assert_eq!(
        config.github_token_with(Some(String::new())).as_deref(),
        Some("from-config")
    );
}
