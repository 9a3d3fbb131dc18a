//! Detection report types.
//!
//! Serialized with camelCase keys. Optional sections are omitted entirely when
//! their source is absent, which is distinct from a present but empty section.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Outcome of resolving one raw token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Version(String),
    /// No release matched. Serialized as `false`.
    Unresolved,
}

impl From<Option<String>> for Resolved {
    fn from(value: Option<String>) -> Self {
        value.map_or(Resolved::Unresolved, Resolved::Version)
    }
}

impl Serialize for Resolved {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Resolved::Version(v) => serializer.serialize_str(v),
            Resolved::Unresolved => serializer.serialize_bool(false),
        }
    }
}

/// Raw tokens and what each resolved to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VersionReport {
    pub raw: Vec<String>,
    pub resolved: IndexMap<String, Resolved>,
}

/// GitHub Actions tokens, with the tokens of each workflow file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubActionsReport {
    pub raw: Vec<String>,
    pub resolved: IndexMap<String, Resolved>,
    pub by_file: IndexMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEntry {
    pub message: String,
}

/// Support of every dependency of a package.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DependencyReport {
    pub versions: BTreeMap<String, Vec<String>>,
    pub support: Vec<PackageReport>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, ErrorEntry>,
}

/// Everything detected for one package.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageReport {
    pub name: String,
    pub version: String,
    pub commit: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travis: Option<VersionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engines: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_actions: Option<GithubActionsReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<DependencyReport>,
}
