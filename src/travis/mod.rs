//! Travis CI configuration: import resolution, merging and version extraction.

mod imports;
mod merge;
mod scan;

use crate::error::Result;
use crate::loader::{optional, LoadCache, Loader, LoaderFactory};
use crate::report::VersionReport;
use crate::resolver::{resolve_tokens, VersionResolver};
use crate::tree::parse_mapping;
use tracing::debug;

pub use imports::{normalize_imports, ImportDirective, ImportResolver};
pub use merge::{deep_merge, deep_merge_append, deep_merge_prepend, merge, MergeMode};
pub use scan::{extract_env_version, scan};

pub const TRAVIS_YML: &str = ".travis.yml";

/// Detect the versions a package tests against on Travis.
///
/// Returns `Ok(None)` when the package has no `.travis.yml`.
pub fn detect(
    loader: &dyn Loader,
    loaders: &dyn LoaderFactory,
    cache: &LoadCache,
    resolver: &dyn VersionResolver,
) -> Result<Option<VersionReport>> {
    let Some(bytes) = optional(loader.load_file(TRAVIS_YML))? else {
        debug!("No {}", TRAVIS_YML);
        return Ok(None);
    };

    let mut tree = parse_mapping(&bytes, TRAVIS_YML)?;
    ImportResolver::new(loader, loaders, cache).apply(&mut tree)?;

    let raw = scan(&tree);
    let resolved = resolve_tokens(resolver, &raw, true)?;

    Ok(Some(VersionReport { raw, resolved }))
}
