//! Configuration tree model.
//!
//! CI documents (`.travis.yml`, workflow files, imported fragments) are read into
//! a closed [`Node`] type rather than a loosely typed value: every scalar keeps
//! the exact text it had in the source, so version tokens like `0.10` or `10.10`
//! survive parsing unchanged.

mod parse;


use indexmap::IndexMap;

pub use parse::{parse_mapping, parse_yaml};

/// An ordered mapping from keys to nodes. Insertion order is preserved.
pub type Mapping = IndexMap<String, Node>;

/// A single value within a configuration tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Node {
    /// An explicit null or an empty value (`key:`).
    #[default]
    Null,
    /// Any scalar, as written in the source document.
    Scalar(String),
    /// An ordered sequence.
    Sequence(Vec<Node>),
    /// A nested mapping.
    Mapping(Mapping),
}

impl Node {
    /// Scalar text, if this node is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    /// Look up `key` if this node is a mapping.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// View this node as a list of items.
    ///
    /// Sequences yield their items, null yields nothing, and any other node is
    /// treated as a single-item list.
    pub fn as_list(&self) -> &[Node] {
        match self {
            Node::Null => &[],
            Node::Sequence(items) => items,
            other => std::slice::from_ref(other),
        }
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Scalar(value.to_string())
    }
}

impl From<Mapping> for Node {
    fn from(value: Mapping) -> Self {
        Node::Mapping(value)
    }
}
