//! The subset of `package.json` read during detection.

use crate::error::Result;
use crate::loader::{load_json, Loader};
use serde::Deserialize;
use std::collections::BTreeMap;

pub const PACKAGE_JSON: &str = "package.json";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub engines: Option<Engines>,

    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,

    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, String>,

    #[serde(default)]
    pub optional_dependencies: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Engines {
    #[serde(default)]
    pub node: Option<String>,
}

impl PackageJson {
    pub fn load(loader: &dyn Loader) -> Result<Self> {
        load_json(loader, PACKAGE_JSON)
    }

    /// Direct dependencies with their declared ranges; dev dependencies when `dev`.
    pub fn direct_dependencies(&self, dev: bool) -> BTreeMap<String, String> {
        let mut direct = self.dependencies.clone();
        direct.extend(
            self.optional_dependencies
                .iter()
                .map(|(name, range)| (name.clone(), range.clone())),
        );
        if dev {
            for (name, range) in &self.dev_dependencies {
                direct.entry(name.clone()).or_insert_with(|| range.clone());
            }
        }
        direct
    }
}
