//! Mapping raw version tokens to concrete Node.js releases.

mod node_releases;
mod range;


use crate::error::Result;
use crate::report::Resolved;
use indexmap::IndexMap;

pub use node_releases::{IndexEntry, LtsField, NodeReleases, ScheduleEntry};
pub use range::Range;

/// Looks up the highest release matching a token.
pub trait VersionResolver {
    /// `Ok(None)` when nothing matches, including for tokens that are not
    /// versions at all. Errors are reserved for failures to load release data.
    fn resolve(&self, token: &str) -> Result<Option<String>>;
}

/// Travis runtime aliases, rewritten before resolution.
pub const NODE_ALIASES: &[(&str, &str)] = &[
    ("latest", "active"),
    ("node", "active"),
    ("stable", "active"),
];

/// The query to resolve for a Travis token.
pub fn alias(token: &str) -> &str {
    NODE_ALIASES
        .iter()
        .find(|(name, _)| *name == token)
        .map_or(token, |(_, target)| target)
}

/// Resolve every token of `raw`, keyed by the token as written.
///
/// With `aliases`, Travis runtime aliases are rewritten first.
pub fn resolve_tokens(
    resolver: &dyn VersionResolver,
    raw: &[String],
    aliases: bool,
) -> Result<IndexMap<String, Resolved>> {
    let mut resolved = IndexMap::with_capacity(raw.len());

    for token in raw {
        let query = if aliases { alias(token) } else { token.as_str() };
        resolved.insert(token.clone(), Resolved::from(resolver.resolve(query)?));
    }

    Ok(resolved)
}
