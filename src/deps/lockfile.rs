//! npm lockfile reading (`package-lock.json` / `npm-shrinkwrap.json`).
//!
//! Version 1 lockfiles nest `dependencies` by install location. Versions 2
//! and 3 list every installed package under `packages`, keyed by its
//! `node_modules` path, with the root package under `""`.

use super::{DependencyOptions, VersionSets};
use serde::Deserialize;
use std::collections::BTreeMap;

const NODE_MODULES: &str = "node_modules/";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lockfile {
    #[serde(default)]
    pub lockfile_version: u32,

    #[serde(default)]
    pub packages: BTreeMap<String, PackageEntry>,

    #[serde(default)]
    pub dependencies: BTreeMap<String, DependencyEntry>,
}

/// An entry of the v2/v3 `packages` map.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub dev: bool,
    #[serde(default)]
    pub link: bool,
}

/// An entry of the v1 `dependencies` tree.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DependencyEntry {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub dev: bool,
    #[serde(default)]
    pub dependencies: BTreeMap<String, DependencyEntry>,
}

impl Lockfile {
    /// Installed versions per package name.
    ///
    /// Without `deep`, only packages named in `direct` that are installed at
    /// the top level are included.
    pub fn versions(&self, direct: &BTreeMap<String, String>, options: &DependencyOptions) -> VersionSets {
        let mut sets = VersionSets::new();

        if !self.packages.is_empty() {
            for (path, entry) in &self.packages {
                let Some(location) = path.strip_prefix(NODE_MODULES) else {
                    // The root package and workspace sources.
                    continue;
                };
                if entry.link || (entry.dev && !options.dev) {
                    continue;
                }
                let Some(version) = &entry.version else {
                    continue;
                };

                let top_level = !location.contains(NODE_MODULES);
                let name = match &entry.name {
                    Some(name) => name.as_str(),
                    None => location.rsplit_once(NODE_MODULES).map_or(location, |(_, n)| n),
                };

                if options.deep || (top_level && direct.contains_key(name)) {
                    sets.entry(name.to_string()).or_default().insert(version.clone());
                }
            }
            return sets;
        }

        collect_v1(&self.dependencies, true, direct, options, &mut sets);
        sets
    }
}

fn collect_v1(
    dependencies: &BTreeMap<String, DependencyEntry>,
    top_level: bool,
    direct: &BTreeMap<String, String>,
    options: &DependencyOptions,
    sets: &mut VersionSets,
) {
    for (name, entry) in dependencies {
        if entry.dev && !options.dev {
            continue;
        }

        if let Some(version) = &entry.version {
            if options.deep || (top_level && direct.contains_key(name)) {
                sets.entry(name.clone()).or_default().insert(version.clone());
            }
        }

        if options.deep {
            collect_v1(&entry.dependencies, false, direct, options, sets);
        }
    }
}
