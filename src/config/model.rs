//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Configuration for a detection run.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Endpoints
    // =========================================================================
    /// npm registry used for packuments.
    #[serde(default = "default_registry_url")]
    pub registry_url: String,

    /// Host serving raw repository files.
    #[serde(default = "default_github_raw_url")]
    pub github_raw_url: String,

    /// GitHub REST API, used for folder listings.
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    /// Node.js release index (`index.json`).
    #[serde(default = "default_node_dist_index_url")]
    pub node_dist_index_url: String,

    /// Node.js release schedule (`schedule.json`).
    #[serde(default = "default_node_schedule_url")]
    pub node_schedule_url: String,

    // =========================================================================
    // HTTP settings
    // =========================================================================
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for each HTTP request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Token for GitHub API requests. `GITHUB_TOKEN` takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,

    // =========================================================================
    // Detection settings
    // =========================================================================
    /// Prefixes of workflow `uses` values treated as node setup steps.
    #[serde(default = "default_setup_node_actions")]
    pub setup_node_actions: Vec<String>,

    /// Whether GitHub Actions workflows are scanned.
    #[serde(default = "default_true")]
    pub github_actions: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_url: default_registry_url(),
            github_raw_url: default_github_raw_url(),
            github_api_url: default_github_api_url(),
            node_dist_index_url: default_node_dist_index_url(),
            node_schedule_url: default_node_schedule_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            github_token: None,
            setup_node_actions: default_setup_node_actions(),
            github_actions: default_true(),
        }
    }
}
