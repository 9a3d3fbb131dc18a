//! Configuration model for detect-node-support.
//!
//! This module defines the Config struct read from an optional YAML file given
//! with `--config`. It supports forward-compatible YAML parsing (unknown fields
//! are ignored), defaults for every field, and validation of config values.

mod model;
mod operations;
pub mod types;

#[cfg(test)]
mod tests;

pub use model::Config;
pub use types::GITHUB_TOKEN_ENV;
