//! Command implementation for detect-node-support.
//!
//! Wires the HTTP-backed loaders, registry and Node.js release data into a
//! [`Detector`] and prints the resulting report.

use crate::cli::Cli;
use crate::config::Config;
use crate::deps::LockfileResolver;
use crate::detect::Detector;
use crate::error::{DetectError, Result};
use crate::http::HttpClient;
use crate::loader::{DefaultLoaders, Endpoints, LoadCache, Registry};
use crate::report::PackageReport;
use crate::resolver::NodeReleases;
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

/// Run a detection for the parsed command line and print the report.
pub fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let report = detect(cli, &config)?;

    let json = render(&report, cli.compact)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", json)
        .map_err(|e| DetectError::UserError(format!("failed to write report: {}", e)))
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => {
            debug!(path = %path.display(), "Loading config");
            Config::load(path)
        }
        None => Ok(Config::default()),
    }
}

fn detect(cli: &Cli, config: &Config) -> Result<PackageReport> {
    let http = HttpClient::new(
        &config.user_agent,
        config.request_timeout(),
        config.resolved_github_token(),
    )?;

    let cache = Arc::new(LoadCache::new());
    let registry = Registry::new(&config.registry_url, http.clone(), Arc::clone(&cache));
    let loaders = DefaultLoaders::new(
        http.clone(),
        Endpoints {
            github_raw_url: config.github_raw_url.clone(),
            github_api_url: config.github_api_url.clone(),
        },
        registry.clone(),
    );
    let releases = NodeReleases::new(http, &config.node_dist_index_url, &config.node_schedule_url);
    let dependencies = LockfileResolver::new(&registry);

    let detector = Detector::new(&loaders, &releases, &dependencies, &cache)
        .with_setup_node_actions(config.setup_node_actions.clone());

    detector.detect(&cli.what, &cli.detect_options(config.github_actions))
}

/// Serialize a report as pretty or single-line JSON.
pub fn render(report: &PackageReport, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(report)
    } else {
        serde_json::to_string_pretty(report)
    };
    json.map_err(|e| DetectError::UserError(format!("failed to serialize report: {}", e)))
}
