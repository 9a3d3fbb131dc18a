//! Interpretation of a user-supplied package identifier.

use std::path::{Path, PathBuf};

/// Where a package lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A local git work tree.
    Path(PathBuf),
    /// A repository URL (github.com only).
    Repository(String),
    /// A package name in the npm registry.
    PackageName(String),
}

impl Target {
    /// Classify `what`.
    ///
    /// In order: a URL is a repository; an existing path is a local work tree;
    /// `owner/repo` (not an `@scope/name`) is a GitHub repository; anything
    /// else is a registry package name.
    pub fn from_what(what: &str) -> Self {
        if is_url(what) {
            return Target::Repository(what.to_string());
        }

        if Path::new(what).exists() {
            return Target::Path(PathBuf::from(what));
        }

        if what.contains('/') && !what.starts_with('@') {
            return Target::Repository(format!("https://github.com/{}", what));
        }

        Target::PackageName(what.to_string())
    }
}

fn is_url(what: &str) -> bool {
    match what.split_once("://") {
        Some((scheme, rest)) => {
            !scheme.is_empty()
                && !rest.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
