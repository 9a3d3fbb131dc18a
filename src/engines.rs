//! The `engines.node` declaration of a package.

use crate::package::PackageJson;

/// `engines.node`, or `None` when the manifest declares no node engine.
pub fn detect(manifest: &PackageJson) -> Option<String> {
    manifest.engines.as_ref().and_then(|engines| engines.node.clone())
}
