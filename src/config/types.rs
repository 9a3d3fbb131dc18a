//! Configuration constants and default value functions.

/// Environment variable that overrides `github_token`.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

pub(crate) fn default_registry_url() -> String {
    "https://registry.npmjs.org".to_string()
}
pub(crate) fn default_github_raw_url() -> String {
    "https://raw.githubusercontent.com".to_string()
}
pub(crate) fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}
pub(crate) fn default_node_dist_index_url() -> String {
    "https://nodejs.org/dist/index.json".to_string()
}
pub(crate) fn default_node_schedule_url() -> String {
    "https://raw.githubusercontent.com/nodejs/Release/master/schedule.json".to_string()
}
pub(crate) fn default_user_agent() -> String {
    format!(
        "{}/{} (https://github.com/pkgjs/detect-node-support)",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}
pub(crate) fn default_request_timeout_secs() -> u64 {
    30
}
pub(crate) fn default_setup_node_actions() -> Vec<String> {
    vec!["actions/setup-node".to_string()]
}
pub(crate) fn default_true() -> bool {
    true
}
