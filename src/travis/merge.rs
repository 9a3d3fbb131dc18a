//! Travis import merge modes.
//!
//! Mirrors the merge semantics of travis-yml's `support/merge.rb`. Every mode
//! walks the keys of `right` and writes into `left`; values taken from `right`
//! are cloned so the merged tree never shares data with the imported document.

use crate::tree::{Mapping, Node};

/// How an imported document is combined with the importing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Recursive merge, sequences concatenated with the imported items last.
    #[default]
    DeepMergeAppend,
    /// Recursive merge, sequences concatenated with the imported items first.
    DeepMergePrepend,
    /// Recursive merge, sequences replaced.
    DeepMerge,
    /// Top-level keys replaced.
    Merge,
}

impl MergeMode {
    /// Parse a merge mode from its Travis name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "deep_merge_append" => Some(Self::DeepMergeAppend),
            "deep_merge_prepend" => Some(Self::DeepMergePrepend),
            "deep_merge" => Some(Self::DeepMerge),
            "merge" => Some(Self::Merge),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeepMergeAppend => "deep_merge_append",
            Self::DeepMergePrepend => "deep_merge_prepend",
            Self::DeepMerge => "deep_merge",
            Self::Merge => "merge",
        }
    }

    /// Merge `right` into `left` in place.
    pub fn apply(self, left: &mut Mapping, right: &Mapping) {
        match self {
            Self::DeepMergeAppend => deep_merge_append(left, right),
            Self::DeepMergePrepend => deep_merge_prepend(left, right),
            Self::DeepMerge => deep_merge(left, right),
            Self::Merge => merge(left, right),
        }
    }
}

/// Recursive merge; when both sides hold a sequence, `right`'s items are appended.
pub fn deep_merge_append(left: &mut Mapping, right: &Mapping) {
    for (key, value) in right {
        match (left.get_mut(key), value) {
            (Some(Node::Mapping(l)), Node::Mapping(r)) => deep_merge_append(l, r),
            (Some(Node::Sequence(l)), Node::Sequence(r)) => l.extend(r.iter().cloned()),
            _ => {
                left.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Recursive merge; when both sides hold a sequence, `right`'s items are prepended.
pub fn deep_merge_prepend(left: &mut Mapping, right: &Mapping) {
    for (key, value) in right {
        match (left.get_mut(key), value) {
            (Some(Node::Mapping(l)), Node::Mapping(r)) => deep_merge_prepend(l, r),
            (Some(Node::Sequence(l)), Node::Sequence(r)) => {
                l.splice(0..0, r.iter().cloned());
            }
            _ => {
                left.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Recursive merge of mappings; everything else from `right` overwrites.
pub fn deep_merge(left: &mut Mapping, right: &Mapping) {
    for (key, value) in right {
        match (left.get_mut(key), value) {
            (Some(Node::Mapping(l)), Node::Mapping(r)) => deep_merge(l, r),
            _ => {
                left.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Shallow merge: every top-level key of `right` overwrites `left`.
pub fn merge(left: &mut Mapping, right: &Mapping) {
    for (key, value) in right {
        left.insert(key.clone(), value.clone());
    }
}
