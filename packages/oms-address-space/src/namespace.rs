//! The namespace URI table shared by every node manager.

use std::collections::HashMap;
use std::sync::RwLock;

/// URI of namespace 0.
pub const UA_NAMESPACE_URI: &str = "http://opcfoundation.org/UA/";

#[derive(Debug)]
struct Registry {
    uris: Vec<String>,
    indices: HashMap<String, u16>,
}

/// Namespace URIs by index.
///
/// Indices are handed out in registration order and never reused, so the
/// table holds at most `u16::MAX + 1` URIs.
#[derive(Debug)]
pub struct NamespaceTable {
    registry: RwLock<Registry>,
}

impl Default for NamespaceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceTable {
    pub fn new() -> Self {
        let registry = Registry {
            uris: vec![UA_NAMESPACE_URI.to_string()],
            indices: HashMap::from([(UA_NAMESPACE_URI.to_string(), 0)]),
        };
        Self {
            registry: RwLock::new(registry),
        }
    }

    /// Index of `uri`, registering it if unknown.
    ///
    /// Returns `None` once every index is taken.
    pub fn get_or_register(&self, uri: &str) -> Option<u16> {
        if let Some(index) = self.index_of(uri) {
            return Some(index);
        }
        let mut registry = self.registry.write().unwrap_or_else(|e| e.into_inner());
        if let Some(&index) = registry.indices.get(uri) {
            return Some(index);
        }
        let index = u16::try_from(registry.uris.len()).ok()?;
        registry.uris.push(uri.to_string());
        registry.indices.insert(uri.to_string(), index);
        Some(index)
    }

    pub fn index_of(&self, uri: &str) -> Option<u16> {
        let registry = self.registry.read().unwrap_or_else(|e| e.into_inner());
        registry.indices.get(uri).copied()
    }

    pub fn uri(&self, index: u16) -> Option<String> {
        let registry = self.registry.read().unwrap_or_else(|e| e.into_inner());
        registry.uris.get(index as usize).cloned()
    }

    pub fn len(&self) -> usize {
        self.registry.read().unwrap_or_else(|e| e.into_inner()).uris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
