//! Node attributes and the per-level descriptor tables.

use crate::manager::NodeManager;
use crate::node_id::{ids, NodeId};
use crate::variant::{DataValue, LocalizedText, NodeClass, QualifiedName, StatusCode, Variant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeId {
    NodeId,
    NodeClass,
    BrowseName,
    DisplayName,
    Description,
    WriteMask,
    UserWriteMask,
    EventNotifier,
    Value,
    DataType,
    ValueRank,
    ArrayDimensions,
    AccessLevel,
    UserAccessLevel,
    MinimumSamplingInterval,
    Historizing,
    Executable,
    UserExecutable,
}

/// Access level bits.
pub mod access {
    pub const CURRENT_READ: u8 = 0x01;
    pub const CURRENT_WRITE: u8 = 0x02;
}

/// Everything about a node that does not depend on store contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    pub node_id: NodeId,
    pub class: NodeClass,
    pub browse_name: String,
    pub description: String,
    pub type_definition: NodeId,
    /// Variables only.
    pub data_type: Option<NodeId>,
    pub value_rank: i32,
    pub writable: bool,
}

impl NodeDescriptor {
    /// Entity objects are browsed by their entity name, without the mark.
    pub fn object(node_id: NodeId, description: impl Into<String>, type_definition: NodeId) -> Self {
        let browse_name = node_id
            .entity_name()
            .or_else(|| node_id.name())
            .unwrap_or_default()
            .to_string();
        Self {
            node_id,
            class: NodeClass::Object,
            browse_name,
            description: description.into(),
            type_definition,
            data_type: None,
            value_rank: -1,
            writable: false,
        }
    }

    pub fn variable(node_id: NodeId, spec: &FieldSpec, type_definition: NodeId) -> Self {
        Self {
            class: NodeClass::Variable,
            data_type: Some(spec.data_type.clone()),
            value_rank: spec.value_rank,
            writable: spec.writable,
            type_definition,
            browse_name: spec.name.to_string(),
            ..Self::object(node_id, spec.description, ids::BASE_DATA_VARIABLE_TYPE)
        }
    }

    pub fn method(node_id: NodeId, browse_name: &str, description: &str) -> Self {
        Self {
            class: NodeClass::Method,
            browse_name: browse_name.to_string(),
            ..Self::object(node_id, description, ids::METHOD_NODE)
        }
    }

    fn access_level(&self) -> u8 {
        if self.writable {
            access::CURRENT_READ | access::CURRENT_WRITE
        } else {
            access::CURRENT_READ
        }
    }
}

/// A row of a fixed variable table.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub data_type: NodeId,
    pub value_rank: i32,
    pub description: &'static str,
    pub writable: bool,
}

/// Look up a row by node name.
pub fn find_field<'a>(table: &'a [FieldSpec], name: &str) -> Option<&'a FieldSpec> {
    table.iter().find(|f| f.name == name)
}

/// Answer an attribute read for a node owned by `manager`.
///
/// `Value` goes to the manager's value resolver; everything else comes
/// from the node's descriptor.
pub fn resolve_attribute<M: NodeManager + ?Sized>(
    manager: &M,
    id: &NodeId,
    attribute: AttributeId,
) -> DataValue {
    let Some(descriptor) = manager.lookup(id) else {
        return DataValue::bad(StatusCode::BadNodeIdUnknown);
    };
    if attribute == AttributeId::Value {
        if descriptor.class != NodeClass::Variable {
            return DataValue::bad(StatusCode::BadAttributeIdInvalid);
        }
        return manager.read_value(id);
    }
    match descriptor_attribute(&descriptor, attribute) {
        Some(value) => DataValue::new(value),
        None => DataValue::bad(StatusCode::BadAttributeIdInvalid),
    }
}

/// Attribute values derivable from the descriptor alone.
///
/// `None` when the attribute does not apply to the node's class.
pub fn descriptor_attribute(descriptor: &NodeDescriptor, attribute: AttributeId) -> Option<Variant> {
    use AttributeId as A;
    use NodeClass as C;

    let class = descriptor.class;
    let value = match (attribute, class) {
        (A::NodeId, _) => Variant::NodeId(descriptor.node_id.clone()),
        (A::NodeClass, _) => Variant::NodeClass(class),
        (A::BrowseName, _) => Variant::QualifiedName(QualifiedName {
            namespace: descriptor.node_id.namespace,
            name: descriptor.browse_name.clone(),
        }),
        (A::DisplayName, _) => Variant::LocalizedText(LocalizedText::english(&descriptor.browse_name)),
        (A::Description, _) => {
            Variant::LocalizedText(LocalizedText::english(&descriptor.description))
        }
        (A::WriteMask | A::UserWriteMask, _) => Variant::UInt32(0),
        (A::EventNotifier, C::Object) => Variant::Byte(0),
        (A::DataType, C::Variable) => Variant::NodeId(descriptor.data_type.clone()?),
        (A::ValueRank, C::Variable) => Variant::Int32(descriptor.value_rank),
        (A::ArrayDimensions, C::Variable) => {
            if descriptor.value_rank >= 1 {
                Variant::UInt32Array(vec![0])
            } else {
                Variant::UInt32Array(Vec::new())
            }
        }
        (A::AccessLevel | A::UserAccessLevel, C::Variable) => {
            Variant::Byte(descriptor.access_level())
        }
        (A::MinimumSamplingInterval, C::Variable) => Variant::Double(0.0),
        (A::Historizing, C::Variable) => Variant::Boolean(false),
        (A::Executable | A::UserExecutable, C::Method) => Variant::Boolean(true),
        _ => return None,
    };
    Some(value)
}
