//! Dependency version resolution.

mod lockfile;
mod registry;


use crate::error::Result;
use crate::loader::{load_json, optional, Loader, PackumentSource};
use crate::package::PackageJson;
use semver::Version;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub use lockfile::{DependencyEntry, Lockfile, PackageEntry};
pub use registry::select_version;

/// Lockfiles, in order of preference.
pub const LOCKFILES: &[&str] = &["package-lock.json", "npm-shrinkwrap.json"];

/// Distinct versions per package name.
pub type VersionSets = BTreeMap<String, BTreeSet<String>>;

/// Which dependencies to include.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DependencyOptions {
    /// Include dev dependencies.
    pub dev: bool,
    /// Include transitive dependencies, not only direct ones.
    pub deep: bool,
}

/// Produces the installed versions of a package's dependencies.
pub trait DependencyResolver {
    /// Versions per dependency name, names sorted.
    fn resolve(
        &self,
        loader: &dyn Loader,
        options: &DependencyOptions,
    ) -> Result<BTreeMap<String, Vec<String>>>;
}

/// Reads the package's lockfile, falling back to registry metadata.
pub struct LockfileResolver<'a> {
    registry: &'a dyn PackumentSource,
}

impl<'a> LockfileResolver<'a> {
    pub fn new(registry: &'a dyn PackumentSource) -> Self {
        Self { registry }
    }
}

impl DependencyResolver for LockfileResolver<'_> {
    fn resolve(
        &self,
        loader: &dyn Loader,
        options: &DependencyOptions,
    ) -> Result<BTreeMap<String, Vec<String>>> {
        let manifest = PackageJson::load(loader)?;
        let direct = manifest.direct_dependencies(options.dev);

        let sets = match load_lockfile(loader)? {
            Some(lockfile) => {
                debug!(version = lockfile.lockfile_version, "Lock file present");
                lockfile.versions(&direct, options)
            }
            None => {
                debug!("Lock file missing, resolving through the registry");
                registry::resolve(self.registry, &direct, options)?
            }
        };

        Ok(sorted(sets))
    }
}

/// The first lockfile present. Parse failures propagate.
pub fn load_lockfile(loader: &dyn Loader) -> Result<Option<Lockfile>> {
    for name in LOCKFILES {
        if let Some(lockfile) = optional(load_json::<Lockfile>(loader, name))? {
            return Ok(Some(lockfile));
        }
    }
    Ok(None)
}

/// Versions of each set in ascending semver order; unparseable versions last.
fn sorted(sets: VersionSets) -> BTreeMap<String, Vec<String>> {
    sets.into_iter()
        .map(|(name, versions)| {
            let mut versions: Vec<String> = versions.into_iter().collect();
            versions.sort_by_cached_key(|v| match Version::parse(v) {
                Ok(parsed) => (0, Some(parsed), String::new()),
                Err(_) => (1, None, v.clone()),
            });
            (name, versions)
        })
        .collect()
}
