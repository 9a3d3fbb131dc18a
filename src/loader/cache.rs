//! Session-scoped cache of loaded resources.

use crate::error::Result;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// Bytes of previously loaded resources, keyed by resource id.
///
/// One cache lives for one detection session. It can be shared between
/// threads and emptied with [`LoadCache::clear`].
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let entries = self.entries.read().unwrap_or_else(|poison| poison.into_inner());
        entries.get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, bytes: Vec<u8>) {
        let mut entries = self.entries.write().unwrap_or_else(|poison| poison.into_inner());
        entries.insert(key.into(), bytes);
    }

    /// Return the cached bytes for `key`, or run `load` and cache its result.
    ///
    /// Failed loads are not cached.
    pub fn get_or_load<F>(&self, key: &str, load: F) -> Result<Vec<u8>>
    where
        F: FnOnce() -> Result<Vec<u8>>,
    {
        if let Some(bytes) = self.get(key) {
            debug!(%key, "Returning cached");
            return Ok(bytes);
        }

        let bytes = load()?;
        self.insert(key, bytes.clone());
        Ok(bytes)
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|poison| poison.into_inner());
        entries.clear();
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|poison| poison.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
