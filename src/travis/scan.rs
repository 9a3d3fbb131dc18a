//! Version token extraction from a resolved Travis document.

use crate::tree::{Mapping, Node};
use indexmap::IndexSet;
use regex::Regex;
use std::sync::LazyLock;

/// Legacy spellings of a node version in `env` matrix entries.
static ENV_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:NODEJS_VER|TRAVIS_NODE_VERSION|NODE_VER)="?(?:node/)?(?P<version>[\w./*]+)"?"#)
        .expect("invalid env version regex")
});

/// Extract the node version assigned in an `env` matrix entry, if any.
pub fn extract_env_version(env: &str) -> Option<&str> {
    ENV_VERSION
        .captures(env)
        .and_then(|captures| captures.name("version"))
        .map(|version| version.as_str())
}

/// Every raw version token declared by `tree`, in first-seen order.
///
/// `tree` must already have had its imports applied.
pub fn scan(tree: &Mapping) -> Vec<String> {
    let mut raw = IndexSet::new();

    if let Some(node_js) = tree.get("node_js") {
        add_scalars(&mut raw, node_js);
    }

    if let Some(env) = tree.get("env") {
        // `env.jobs` is the newer spelling of `env.matrix`.
        for key in ["matrix", "jobs"] {
            let entries = env.get(key).map(Node::as_list).unwrap_or_default();
            for entry in entries.iter().filter_map(Node::as_str) {
                if let Some(version) = extract_env_version(entry) {
                    raw.insert(version.to_string());
                }
            }
        }
    }

    // `jobs` is the newer spelling of `matrix`.
    for key in ["matrix", "jobs"] {
        let includes = tree
            .get(key)
            .and_then(|m| m.get("include"))
            .map(Node::as_list)
            .unwrap_or_default();

        for include in includes {
            if let Some(node_js) = include.get("node_js") {
                add_scalars(&mut raw, node_js);
            }
        }
    }

    if raw.is_empty() && tree.get("language").and_then(Node::as_str) == Some("node_js") {
        raw.insert("latest".to_string());
    }

    raw.into_iter().collect()
}

fn add_scalars(raw: &mut IndexSet<String>, node: &Node) {
    for value in node.as_list().iter().filter_map(Node::as_str) {
        raw.insert(value.to_string());
    }
}
