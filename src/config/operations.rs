//! Config loading, validation, and utility operations.

use super::model::Config;
use super::types::GITHUB_TOKEN_ENV;
use crate::error::{DetectError, Result};
use std::path::Path;
use std::time::Duration;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(DetectError::ConfigError)` - Read or parse error, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            DetectError::ConfigError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| DetectError::ConfigError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            DetectError::ConfigError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - every URL must use `http://` or `https://`
    /// - `request_timeout_secs` must be positive
    /// - `setup_node_actions` entries must be non-empty
    pub fn validate(&self) -> Result<()> {
        let urls = [
            ("registry_url", &self.registry_url),
            ("github_raw_url", &self.github_raw_url),
            ("github_api_url", &self.github_api_url),
            ("node_dist_index_url", &self.node_dist_index_url),
            ("node_schedule_url", &self.node_schedule_url),
        ];

        for (field, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(DetectError::ConfigError(format!(
                    "config validation failed: {} must be an http(s) URL (found '{}')",
                    field, url
                )));
            }
        }

        if self.request_timeout_secs == 0 {
            return Err(DetectError::ConfigError(
                "config validation failed: request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.setup_node_actions.iter().any(|a| a.trim().is_empty()) {
            return Err(DetectError::ConfigError(
                "config validation failed: setup_node_actions entries must be non-empty"
                    .to_string(),
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Token for GitHub requests: `GITHUB_TOKEN` if set and non-empty, else `github_token`.
    pub fn resolved_github_token(&self) -> Option<String> {
        self.github_token_with(std::env::var(GITHUB_TOKEN_ENV).ok())
    }

    pub(crate) fn github_token_with(&self, env: Option<String>) -> Option<String> {
        env.filter(|t| !t.is_empty())
            .or_else(|| self.github_token.clone())
    }
}
