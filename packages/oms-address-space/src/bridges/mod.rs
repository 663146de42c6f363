//! Subtree bridges: one node manager per level of the store hierarchy.
//!
//! ```text
//! Objects
//! └── OMS                         (OmsBridge, root namespace)
//!     ├── alpha                   (MemoryBridge, "<root>/alpha")
//!     │   ├── Owner
//!     │   └── 1                   (BlockBridge, "<root>/alpha/1")
//!     │       ├── Title
//!     │       └── ...
//!     └── beta
//! ```
//!
//! A bridge creates the bridge for a child entity the first time one of its
//! containers is browsed, and registers it with the [`NodeManagerTable`].

mod block;
mod memory;
mod oms;

pub use block::BlockBridge;
pub use memory::MemoryBridge;
pub use oms::OmsBridge;

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, Weak};

use oms_client::ObjectMemoryStore;

use crate::manager::{NodeManager, NodeManagerTable};

/// Capabilities of block nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPolicy {
    /// Expose the "Delete Block" method.
    pub deletable: bool,
}

impl Default for BlockPolicy {
    fn default() -> Self {
        Self { deletable: true }
    }
}

/// What every bridge is constructed with.
#[derive(Clone)]
pub struct BridgeContext {
    pub store: Arc<dyn ObjectMemoryStore>,
    /// Non-owning: the table owns the bridges.
    pub table: Weak<NodeManagerTable>,
    pub policy: BlockPolicy,
}

impl BridgeContext {
    pub fn new(
        store: Arc<dyn ObjectMemoryStore>,
        table: &Arc<NodeManagerTable>,
        policy: BlockPolicy,
    ) -> Self {
        Self {
            store,
            table: Arc::downgrade(table),
            policy,
        }
    }
}

/// Child bridges keyed by entity name.
pub struct ChildArena<T> {
    children: RwLock<BTreeMap<String, Arc<T>>>,
}

impl<T> Default for ChildArena<T> {
    fn default() -> Self {
        Self {
            children: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T: NodeManager + 'static> ChildArena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        let children = self.children.read().unwrap_or_else(|e| e.into_inner());
        children.get(name).cloned()
    }

    /// The bridge for `name`, building and registering it on first use.
    ///
    /// Racing callers for the same name all get the same instance. `None`
    /// when `create` could not build one; nothing is recorded then, so a
    /// later call tries again.
    pub fn get_or_create(
        &self,
        name: &str,
        table: &NodeManagerTable,
        create: impl FnOnce() -> Option<T>,
    ) -> Option<Arc<T>> {
        if let Some(child) = self.get(name) {
            return Some(child);
        }
        let mut children = self.children.write().unwrap_or_else(|e| e.into_inner());
        if let Some(child) = children.get(name) {
            return Some(Arc::clone(child));
        }
        let child = Arc::new(create()?);
        table.register(child.clone() as Arc<dyn NodeManager>);
        children.insert(name.to_string(), Arc::clone(&child));
        tracing::debug!(child = name, namespace = child.namespace_index(), "bridge created");
        Some(child)
    }

    pub fn len(&self) -> usize {
        self.children.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
