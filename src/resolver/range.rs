//! npm-style version ranges on top of `semver::VersionReq`.
//!
//! `semver` follows Cargo's grammar, so npm spellings are rewritten first:
//! comparators are comma separated, bare versions are X-ranges rather than
//! caret requirements, `v` prefixes are dropped, hyphen ranges are expanded,
//! and `||` unions become a list of requirements.

use semver::{Version, VersionReq};

/// A union of requirements. Matches if any requirement matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    alternatives: Vec<VersionReq>,
}

impl Range {
    /// Parse an npm-style range. Returns `None` for anything unparseable.
    pub fn parse(range: &str) -> Option<Self> {
        let alternatives = range
            .split("||")
            .map(|part| parse_comparators(part.trim()))
            .collect::<Option<Vec<_>>>()?;

        Some(Self { alternatives })
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }
}

fn parse_comparators(part: &str) -> Option<VersionReq> {
    if part.is_empty() {
        return Some(VersionReq::STAR);
    }

    if let Some((low, high)) = part.split_once(" - ") {
        let req = format!(">={}, <={}", bare(low.trim()), bare(high.trim()));
        return VersionReq::parse(&req).ok();
    }

    let mut comparators: Vec<String> = Vec::new();
    let mut pending_op = String::new();

    for token in part.split([' ', ',']).filter(|t| !t.is_empty()) {
        // `>= 10` is written with a space between operator and version.
        if token.chars().all(is_operator_char) {
            pending_op.push_str(token);
            continue;
        }

        let comparator = format!("{}{}", std::mem::take(&mut pending_op), token);
        comparators.push(comparator_for(&comparator));
    }

    if !pending_op.is_empty() || comparators.is_empty() {
        return None;
    }

    VersionReq::parse(&comparators.join(", ")).ok()
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '^' | '~')
}

/// Rewrite one npm comparator into `semver` syntax.
fn comparator_for(comparator: &str) -> String {
    let split = comparator
        .find(|c: char| !is_operator_char(c))
        .unwrap_or(comparator.len());
    let (op, version) = comparator.split_at(split);
    let version = bare(version);

    if !op.is_empty() {
        return format!("{}{}", op, version);
    }

    if is_wildcard(version) {
        version.to_string()
    } else {
        // npm reads a bare partial version as an X-range, Cargo as a caret.
        format!("={}", version)
    }
}

fn bare(version: &str) -> &str {
    version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('='))
        .unwrap_or(version)
}

fn is_wildcard(version: &str) -> bool {
    version
        .split('.')
        .any(|part| matches!(part, "x" | "X" | "*"))
}
