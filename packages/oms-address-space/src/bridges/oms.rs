//! The server root: its folder, Create new OMM and one memory bridge per memory.

use std::sync::Arc;

use oms_client::ObjectMemoryStore;

use super::{BlockPolicy, BridgeContext, ChildArena, MemoryBridge};
use crate::attributes::{resolve_attribute, AttributeId, NodeDescriptor};
use crate::error::BridgeError;
use crate::manager::{IoManager, NodeManager, NodeManagerTable, UserIdentity};
use crate::methods::{CreateMemory, MethodSet};
use crate::node_id::{ids, NodeId};
use crate::reference::{Reference, ReferenceBuilder};
use crate::variant::{DataValue, StatusCode, Variant};

/// Browse name of the server root folder.
pub const ROOT_NAME: &str = "OMS";

/// Root level: the server folder and the memories it organizes.
pub struct OmsBridge {
    ctx: BridgeContext,
    namespace: u16,
    uri: String,
    root: NodeId,
    methods: MethodSet,
    memories: ChildArena<MemoryBridge>,
}

impl std::fmt::Debug for OmsBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OmsBridge")
            .field("namespace", &self.namespace)
            .field("uri", &self.uri)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl OmsBridge {
    pub fn new(ctx: BridgeContext, namespace: u16, uri: impl Into<String>) -> Self {
        let methods = MethodSet::new().with(namespace, CreateMemory::new(ctx.store.clone()));
        Self {
            ctx,
            namespace,
            uri: uri.into(),
            root: NodeId::string(namespace, ROOT_NAME),
            methods,
            memories: ChildArena::new(),
        }
    }

    /// Build the root bridge for `uri`, register it and hang its folder
    /// under the Objects folder.
    pub fn install(
        table: &Arc<NodeManagerTable>,
        store: Arc<dyn ObjectMemoryStore>,
        uri: &str,
        policy: BlockPolicy,
    ) -> Result<Arc<Self>, BridgeError> {
        let namespace = table
            .namespaces()
            .get_or_register(uri)
            .ok_or_else(|| BridgeError::NamespacesExhausted {
                uri: uri.to_string(),
            })?;
        let ctx = BridgeContext::new(store, table, policy);
        let bridge = Arc::new(Self::new(ctx, namespace, uri));
        if !table.register(bridge.clone()) {
            tracing::warn!(uri, namespace, "namespace already has a node manager");
        }
        table.add_object_root(bridge.root.clone());
        tracing::info!(uri, namespace, "object memory server bridge installed");
        Ok(bridge)
    }

    pub fn root_id(&self) -> &NodeId {
        &self.root
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The bridge of a memory that has been browsed before.
    pub fn memory(&self, name: &str) -> Option<Arc<MemoryBridge>> {
        self.memories.get(name)
    }

    pub fn method(&self, name: &str) -> Option<NodeId> {
        self.methods.get(name).map(|m| m.node_id().clone())
    }

    /// Folder ids of the memories currently on the server.
    fn memory_folders(&self) -> Vec<NodeId> {
        let names = match self.ctx.store.memory_names() {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(error = %e, "could not list memories");
                return Vec::new();
            }
        };
        let Some(table) = self.ctx.table.upgrade() else {
            return Vec::new();
        };
        names
            .iter()
            .filter_map(|name| {
                let memory = self.memories.get_or_create(name, &table, || {
                    let uri = format!("{}/{}", self.uri, name);
                    let Some(namespace) = table.namespaces().get_or_register(&uri) else {
                        tracing::warn!(memory = %name, uri = %uri, "namespace table full, memory skipped");
                        return None;
                    };
                    Some(MemoryBridge::new(self.ctx.clone(), namespace, uri, name, self.root.clone()))
                })?;
                Some(memory.folder_id().clone())
            })
            .collect()
    }
}

impl IoManager for OmsBridge {
    fn read_descriptor(&self, id: &NodeId, attribute: AttributeId) -> DataValue {
        resolve_attribute(self, id, attribute)
    }

    fn read_value(&self, id: &NodeId) -> DataValue {
        let Some(name) = self.node_name(id) else {
            return DataValue::bad(StatusCode::BadNodeIdUnknown);
        };
        match self.methods.argument_value(name) {
            Some(value) => value.served_now(),
            None if self.has_node(id) => DataValue::bad(StatusCode::BadAttributeIdInvalid),
            None => DataValue::bad(StatusCode::BadNodeIdUnknown),
        }
    }

    fn write_value(&self, _caller: &UserIdentity, id: &NodeId, _value: &Variant) -> StatusCode {
        if self.has_node(id) {
            StatusCode::BadNotWritable
        } else {
            StatusCode::BadNodeIdUnknown
        }
    }
}

impl NodeManager for OmsBridge {
    fn namespace_index(&self) -> u16 {
        self.namespace
    }

    fn describe(&self, name: &str) -> Option<NodeDescriptor> {
        if name == ROOT_NAME {
            return Some(NodeDescriptor::object(
                self.root.clone(),
                "Object memory server",
                ids::FOLDER_TYPE,
            ));
        }
        self.methods.describe(self.namespace, name)
    }

    fn references(&self, id: &NodeId) -> Result<Vec<Reference>, BridgeError> {
        let name = self.node_name(id).ok_or_else(|| BridgeError::not_found(id))?;
        if name == ROOT_NAME {
            tracing::debug!(node = %id, "browsing server root");
            return Ok(ReferenceBuilder::new(self.root.clone())
                .inverse(ids::OBJECTS_FOLDER, ids::ORGANIZES)
                .type_definition(ids::FOLDER_TYPE)
                .forward_all(self.methods.node_ids(), ids::HAS_COMPONENT)
                .forward_all(self.memory_folders(), ids::ORGANIZES)
                .build());
        }
        self.methods
            .references(&self.root, name)
            .ok_or_else(|| BridgeError::not_found(id))
    }

    fn call_method(
        &self,
        caller: &UserIdentity,
        object: &NodeId,
        method: &NodeId,
        args: &[Variant],
    ) -> Result<Option<Vec<Variant>>, BridgeError> {
        let Some(name) = self.node_name(method) else {
            return Ok(None);
        };
        tracing::debug!(object = %object, method = name, "method call");
        self.methods.call(name, caller, args)
    }
}
