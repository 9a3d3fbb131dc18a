//! CLI argument parsing for detect-node-support.
//!
//! Uses clap derive macros for declarative argument definitions.
//! The detection itself lives in the `commands` module.

use crate::detect::DetectOptions;
use crate::logging::{LogFormat, LogLevel};
use clap::Parser;
use std::path::PathBuf;

/// Detect which Node.js versions a package declares support for.
///
/// Looks at `.travis.yml` (including imports), `engines` in `package.json`
/// and GitHub Actions workflows, and prints a JSON report to stdout.
#[derive(Parser, Debug)]
#[command(name = "detect-node-support")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a local git repository, a repository URL, `owner/repo` or an npm package name.
    #[arg(default_value = ".")]
    pub what: String,

    /// Also detect support for the package's dependencies.
    #[arg(long)]
    pub deps: bool,

    /// With --deps, include dev dependencies.
    #[arg(long, requires = "deps")]
    pub dev: bool,

    /// With --deps, include transitive dependencies.
    #[arg(long, requires = "deps")]
    pub deep: bool,

    /// Skip scanning GitHub Actions workflows.
    #[arg(long)]
    pub no_github_actions: bool,

    /// Path to a YAML config file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level, overridden by RUST_LOG.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    /// Print the report on a single line.
    #[arg(long)]
    pub compact: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Detection options, with workflow scanning enabled only if `config_allows` it too.
    pub fn detect_options(&self, config_allows: bool) -> DetectOptions {
        DetectOptions {
            deps: self.deps,
            dev: self.dev,
            deep: self.deep,
            github_actions: config_allows && !self.no_github_actions,
        }
    }
}
