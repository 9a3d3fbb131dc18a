//! Dependency versions from registry metadata, for packages without a lockfile.

use super::{DependencyOptions, VersionSets};
use crate::error::Result;
use crate::loader::{Packument, PackumentSource};
use crate::resolver::Range;
use semver::Version;
use std::collections::{BTreeMap, HashSet, VecDeque};
use tracing::{debug, warn};

/// Pick the version a range installs: the highest satisfying release, or a dist-tag.
pub fn select_version(packument: &Packument, range: &str) -> Option<String> {
    if let Some(tagged) = packument.dist_tags.get(range) {
        return Some(tagged.clone());
    }

    let range = Range::parse(range)?;
    packument
        .versions
        .keys()
        .filter_map(|v| Version::parse(v).ok())
        .filter(|v| v.pre.is_empty() && range.matches(v))
        .max()
        .map(|v| v.to_string())
}

/// Resolve `direct` dependency ranges through the registry, following
/// dependencies of the selected versions when `deep`.
pub fn resolve(
    registry: &dyn PackumentSource,
    direct: &BTreeMap<String, String>,
    options: &DependencyOptions,
) -> Result<VersionSets> {
    let mut sets = VersionSets::new();
    let mut seen = HashSet::new();
    let mut queue: VecDeque<(String, String)> = direct
        .iter()
        .map(|(name, range)| (name.clone(), range.clone()))
        .collect();

    while let Some((name, range)) = queue.pop_front() {
        if !seen.insert((name.clone(), range.clone())) {
            continue;
        }

        let packument = registry.packument(&name)?;
        let Some(version) = select_version(&packument, &range) else {
            warn!(%name, %range, "No version satisfies range");
            continue;
        };

        debug!(%name, %range, %version, "Selected version");
        sets.entry(name.clone()).or_default().insert(version.clone());

        if options.deep {
            if let Some(manifest) = packument.versions.get(&version) {
                queue.extend(
                    manifest
                        .dependencies
                        .iter()
                        .map(|(name, range)| (name.clone(), range.clone())),
                );
            }
        }
    }

    Ok(sets)
}
