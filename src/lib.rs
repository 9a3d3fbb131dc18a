//! detect-node-support: find the Node.js versions a package declares support for.
//!
//! Support is read from three places: `.travis.yml` (with its imports merged
//! in), `engines.node` in `package.json`, and `actions/setup-node` steps in
//! GitHub Actions workflows. Packages can be local git work trees, GitHub
//! repositories or npm registry packages.

pub mod cli;
pub mod commands;
pub mod config;
pub mod deps;
pub mod detect;
pub mod engines;
pub mod error;
pub mod exit_codes;
pub mod git;
pub mod github_actions;
pub mod http;
pub mod loader;
pub mod logging;
pub mod package;
pub mod report;
pub mod resolver;
pub mod travis;
pub mod tree;

#[cfg(test)]
pub(crate) mod test_support;

pub use detect::{DetectOptions, Detector};
pub use error::{DetectError, Result};
pub use report::PackageReport;
