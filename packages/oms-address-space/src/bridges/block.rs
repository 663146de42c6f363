//! One block: its object node, the metadata variables and Delete Block.

use oms_client::{BlockFieldUpdate, Link, MultiLangText, TypedValue};

use super::BridgeContext;
use crate::attributes::{find_field, resolve_attribute, AttributeId, FieldSpec, NodeDescriptor};
use crate::error::BridgeError;
use crate::manager::{IoManager, NodeManager, UserIdentity};
use crate::methods::{DeleteBlock, MethodSet};
use crate::node_id::{ids, NodeId};
use crate::projector::{field_value, BlockField};
use crate::reference::{Reference, ReferenceBuilder};
use crate::variant::{epoch, DataValue, StatusCode, Variant};

const fn field(
    name: &'static str,
    data_type: NodeId,
    description: &'static str,
    writable: bool,
) -> FieldSpec {
    FieldSpec {
        name,
        data_type,
        value_rank: -1,
        description,
        writable,
    }
}

static BLOCK_FIELDS: &[FieldSpec] = &[
    field("Contributors", ids::STRUCTURE, "Contributors of the block", false),
    field("Creator", ids::STRUCTURE, "Creator of the block", false),
    field("Description", ids::LOCALIZED_TEXT, "Description of the block", true),
    field("Format", ids::STRING, "Format of the block payload", false),
    field("ID", ids::STRING, "ID of the block", false),
    field("Link", ids::STRING, "Link to external payload", true),
    field("Namespace", ids::STRING, "Namespace of the block", false),
    field("Payload", ids::STRING, "Inline payload of the block", true),
    field("PrimaryID", ids::STRING, "Primary ID of the owning memory", false),
    field("Subject", ids::STRUCTURE, "Subject of the block", false),
    field("Title", ids::LOCALIZED_TEXT, "Title of the block", true),
    field("Type", ids::STRING, "Type of the block", false),
];

/// One block: its object node and its metadata variables.
pub struct BlockBridge {
    ctx: BridgeContext,
    namespace: u16,
    memory: String,
    block: String,
    object: NodeId,
    parent: NodeId,
    methods: MethodSet,
}

impl BlockBridge {
    pub fn new(ctx: BridgeContext, namespace: u16, memory: &str, block: &str, parent: NodeId) -> Self {
        let mut methods = MethodSet::new();
        if ctx.policy.deletable {
            methods = methods.with(namespace, DeleteBlock::new(ctx.store.clone(), memory, block));
        }
        Self {
            ctx,
            namespace,
            memory: memory.to_string(),
            block: block.to_string(),
            object: NodeId::entity(namespace, block),
            parent,
            methods,
        }
    }

    pub fn object_id(&self) -> &NodeId {
        &self.object
    }

    pub fn field_id(&self, field: BlockField) -> NodeId {
        NodeId::string(self.namespace, field.name())
    }

    pub fn method(&self, name: &str) -> Option<NodeId> {
        self.methods.get(name).map(|m| m.node_id().clone())
    }

    /// Field names to expose: a link block shows Link, any other block Payload.
    fn visible_fields(&self) -> Vec<NodeId> {
        let is_link = match self.ctx.store.block(&self.memory, &self.block) {
            Ok(Some(block)) => block.is_link_block(),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(memory = %self.memory, block = %self.block, error = %e, "could not fetch block");
                false
            }
        };
        let hidden = if is_link {
            BlockField::Payload
        } else {
            BlockField::Link
        };
        BlockField::ALL
            .into_iter()
            .filter(|f| *f != hidden)
            .map(|f| self.field_id(f))
            .collect()
    }

    fn update_for(field: BlockField, value: &Variant) -> Option<BlockFieldUpdate> {
        let localized = |value: &Variant| match value {
            Variant::String(s) => Some(MultiLangText::single("en", s.as_str())),
            Variant::LocalizedText(lt) => {
                let locale = if lt.locale.is_empty() { "en" } else { lt.locale.as_str() };
                Some(MultiLangText::single(locale, lt.text.as_str()))
            }
            _ => None,
        };
        match field {
            BlockField::Title => localized(value).map(BlockFieldUpdate::Title),
            BlockField::Description => localized(value).map(BlockFieldUpdate::Description),
            BlockField::Payload => match value {
                Variant::String(s) => Some(BlockFieldUpdate::Payload(TypedValue::text(s.as_str()))),
                _ => None,
            },
            BlockField::Link => match value {
                Variant::String(s) => Some(BlockFieldUpdate::Link(Link::url(s.as_str()))),
                _ => None,
            },
            _ => None,
        }
    }
}

impl IoManager for BlockBridge {
    fn read_descriptor(&self, id: &NodeId, attribute: AttributeId) -> DataValue {
        resolve_attribute(self, id, attribute)
    }

    fn read_value(&self, id: &NodeId) -> DataValue {
        let Some(name) = self.node_name(id) else {
            return DataValue::bad(StatusCode::BadNodeIdUnknown);
        };
        if *id == self.object {
            return DataValue::bad(StatusCode::BadAttributeIdInvalid);
        }
        let Some(field) = BlockField::from_name(name) else {
            return match self.methods.argument_value(name) {
                Some(value) => value.served_now(),
                None if self.has_node(id) => DataValue::bad(StatusCode::BadAttributeIdInvalid),
                None => DataValue::bad(StatusCode::BadNodeIdUnknown),
            };
        };
        match self.ctx.store.block(&self.memory, &self.block) {
            Ok(Some(block)) => {
                let source = block.last_modified().unwrap_or_else(epoch);
                DataValue::new(field_value(&block, field)).stamped(source)
            }
            Ok(None) => DataValue::bad(StatusCode::BadNoData),
            Err(e) => {
                let e = BridgeError::from(e);
                tracing::warn!(memory = %self.memory, block = %self.block, field = name, error = %e, "value unavailable");
                DataValue::bad(e.status())
            }
        }
    }

    fn write_value(&self, caller: &UserIdentity, id: &NodeId, value: &Variant) -> StatusCode {
        let Some(descriptor) = self.lookup(id) else {
            return StatusCode::BadNodeIdUnknown;
        };
        let field = match BlockField::from_name(&descriptor.browse_name) {
            Some(field) if descriptor.writable && descriptor.node_id != self.object => field,
            _ => return StatusCode::BadNotWritable,
        };
        let Some(update) = Self::update_for(field, value) else {
            return StatusCode::BadTypeMismatch;
        };
        let credentials = caller.credentials();
        match self
            .ctx
            .store
            .update_block_field(&self.memory, &self.block, update, credentials.as_ref())
        {
            Ok(()) => {
                tracing::info!(memory = %self.memory, block = %self.block, field = field.name(), "field written");
                StatusCode::Good
            }
            Err(e) => {
                let e = BridgeError::from(e);
                tracing::error!(memory = %self.memory, block = %self.block, field = field.name(), error = %e, "write failed");
                e.status()
            }
        }
    }
}

impl NodeManager for BlockBridge {
    fn namespace_index(&self) -> u16 {
        self.namespace
    }

    fn describe(&self, name: &str) -> Option<NodeDescriptor> {
        if self.object.name() == Some(name) {
            return Some(NodeDescriptor::object(
                self.object.clone(),
                format!("Block {} of {}", self.block, self.memory),
                ids::BASE_OBJECT_TYPE,
            ));
        }
        if let Some(spec) = find_field(BLOCK_FIELDS, name) {
            return Some(NodeDescriptor::variable(
                NodeId::string(self.namespace, name),
                spec,
                ids::BASE_DATA_VARIABLE_TYPE,
            ));
        }
        self.methods.describe(self.namespace, name)
    }

    fn references(&self, id: &NodeId) -> Result<Vec<Reference>, BridgeError> {
        let name = self.node_name(id).ok_or_else(|| BridgeError::not_found(id))?;
        if *id == self.object {
            tracing::debug!(memory = %self.memory, block = %self.block, "browsing block");
            return Ok(ReferenceBuilder::new(self.object.clone())
                .inverse(self.parent.clone(), ids::HAS_COMPONENT)
                .type_definition(ids::BASE_OBJECT_TYPE)
                .forward_all(self.visible_fields(), ids::HAS_COMPONENT)
                .forward_all(self.methods.node_ids(), ids::HAS_COMPONENT)
                .build());
        }
        if find_field(BLOCK_FIELDS, name).is_some() {
            return Ok(ReferenceBuilder::new(id.clone())
                .inverse(self.object.clone(), ids::HAS_COMPONENT)
                .type_definition(ids::BASE_DATA_VARIABLE_TYPE)
                .build());
        }
        self.methods
            .references(&self.object, name)
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
        tracing::debug!(object = %object, method = name, block = %self.block, "method call");
        self.methods.call(name, caller, args)
    }
}
