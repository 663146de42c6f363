//! One memory: its folder, the Owner property and the memory-level methods.

use std::sync::Arc;

use super::{BlockBridge, BridgeContext, ChildArena};
use crate::attributes::{find_field, resolve_attribute, AttributeId, FieldSpec, NodeDescriptor};
use crate::error::BridgeError;
use crate::manager::{IoManager, NodeManager, UserIdentity};
use crate::methods::{ChangeAcl, ChangeOwner, CreateBlock, DeleteMemory, MethodSet, SearchBlock};
use crate::node_id::{ids, NodeId};
use crate::reference::{Reference, ReferenceBuilder};
use crate::variant::{DataValue, StatusCode, Variant};

pub const OWNER: &str = "Owner";

static MEMORY_PROPERTIES: &[FieldSpec] = &[FieldSpec {
    name: OWNER,
    data_type: ids::STRING,
    value_rank: -1,
    description: "Owner of the object memory",
    writable: false,
}];

/// One memory: its folder, the owner property, memory-level methods and the
/// blocks it organizes.
pub struct MemoryBridge {
    ctx: BridgeContext,
    namespace: u16,
    uri: String,
    memory: String,
    folder: NodeId,
    parent: NodeId,
    methods: MethodSet,
    blocks: ChildArena<BlockBridge>,
}

impl MemoryBridge {
    pub fn new(
        ctx: BridgeContext,
        namespace: u16,
        uri: impl Into<String>,
        memory: impl Into<String>,
        parent: NodeId,
    ) -> Self {
        let memory = memory.into();
        let store = &ctx.store;
        let methods = MethodSet::new()
            .with(namespace, DeleteMemory::new(store.clone(), memory.clone()))
            .with(namespace, ChangeAcl::new(store.clone(), memory.clone()))
            .with(namespace, ChangeOwner::new(store.clone(), memory.clone()))
            .with(namespace, CreateBlock::new(store.clone(), memory.clone()))
            .with(namespace, SearchBlock::new(store.clone(), memory.clone()));
        Self {
            folder: NodeId::entity(namespace, &memory),
            ctx,
            namespace,
            uri: uri.into(),
            memory,
            parent,
            methods,
            blocks: ChildArena::new(),
        }
    }

    pub fn folder_id(&self) -> &NodeId {
        &self.folder
    }

    pub fn memory_name(&self) -> &str {
        &self.memory
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The bridge of a block that has been browsed before.
    pub fn block(&self, id: &str) -> Option<Arc<BlockBridge>> {
        self.blocks.get(id)
    }

    pub fn method(&self, name: &str) -> Option<NodeId> {
        self.methods.get(name).map(|m| m.node_id().clone())
    }

    pub fn owner_id(&self) -> NodeId {
        NodeId::string(self.namespace, OWNER)
    }

    /// Object ids of the blocks currently in the memory.
    fn block_objects(&self) -> Vec<NodeId> {
        let blocks = match self.ctx.store.blocks(&self.memory) {
            Ok(blocks) => blocks,
            Err(e) => {
                tracing::warn!(memory = %self.memory, error = %e, "could not list blocks");
                return Vec::new();
            }
        };
        let Some(table) = self.ctx.table.upgrade() else {
            return Vec::new();
        };
        blocks
            .iter()
            .filter_map(|block| {
                let bridge = self.blocks.get_or_create(&block.id, &table, || {
                    let uri = format!("{}/{}", self.uri, block.id);
                    let Some(namespace) = table.namespaces().get_or_register(&uri) else {
                        tracing::warn!(memory = %self.memory, block = %block.id, "namespace table full, block skipped");
                        return None;
                    };
                    Some(BlockBridge::new(
                        self.ctx.clone(),
                        namespace,
                        &self.memory,
                        &block.id,
                        self.folder.clone(),
                    ))
                })?;
                Some(bridge.object_id().clone())
            })
            .collect()
    }
}

impl IoManager for MemoryBridge {
    fn read_descriptor(&self, id: &NodeId, attribute: AttributeId) -> DataValue {
        resolve_attribute(self, id, attribute)
    }

    fn read_value(&self, id: &NodeId) -> DataValue {
        let Some(name) = self.node_name(id) else {
            return DataValue::bad(StatusCode::BadNodeIdUnknown);
        };
        if *id == self.folder {
            return DataValue::bad(StatusCode::BadAttributeIdInvalid);
        }
        if name == OWNER {
            return match self.ctx.store.owner(&self.memory) {
                Ok(owner) => DataValue::new(owner).served_now(),
                Err(e) => {
                    let e = BridgeError::from(e);
                    tracing::warn!(memory = %self.memory, error = %e, "owner unavailable");
                    DataValue::bad(e.status())
                }
            };
        }
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

impl NodeManager for MemoryBridge {
    fn namespace_index(&self) -> u16 {
        self.namespace
    }

    fn describe(&self, name: &str) -> Option<NodeDescriptor> {
        if self.folder.name() == Some(name) {
            return Some(NodeDescriptor::object(
                self.folder.clone(),
                format!("Object memory {}", self.memory),
                ids::FOLDER_TYPE,
            ));
        }
        if let Some(spec) = find_field(MEMORY_PROPERTIES, name) {
            return Some(NodeDescriptor::variable(
                NodeId::string(self.namespace, name),
                spec,
                ids::PROPERTY_TYPE,
            ));
        }
        self.methods.describe(self.namespace, name)
    }

    fn references(&self, id: &NodeId) -> Result<Vec<Reference>, BridgeError> {
        let name = self.node_name(id).ok_or_else(|| BridgeError::not_found(id))?;
        if *id == self.folder {
            tracing::debug!(memory = %self.memory, "browsing memory");
            return Ok(ReferenceBuilder::new(self.folder.clone())
                .inverse(self.parent.clone(), ids::ORGANIZES)
                .type_definition(ids::FOLDER_TYPE)
                .forward(self.owner_id(), ids::HAS_PROPERTY)
                .forward_all(self.methods.node_ids(), ids::HAS_COMPONENT)
                .forward_all(self.block_objects(), ids::HAS_COMPONENT)
                .build());
        }
        if name == OWNER {
            return Ok(ReferenceBuilder::new(self.owner_id())
                .inverse(self.folder.clone(), ids::HAS_PROPERTY)
                .type_definition(ids::PROPERTY_TYPE)
                .build());
        }
        self.methods
            .references(&self.folder, name)
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
        tracing::debug!(object = %object, method = name, memory = %self.memory, "method call");
        self.methods.call(name, caller, args)
    }
}
