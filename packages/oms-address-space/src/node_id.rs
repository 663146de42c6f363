//! Node identifiers.

use std::fmt;

/// The part of a node id that is unique within one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Identifier {
    Numeric(u32),
    String(String),
}

/// A `(namespace, identifier)` pair.
///
/// Names only have to be unique inside their namespace: `(2, "Creator")`
/// and `(3, "Creator")` are unrelated nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub namespace: u16,
    pub identifier: Identifier,
}

impl NodeId {
    pub const fn numeric(namespace: u16, id: u32) -> Self {
        Self {
            namespace,
            identifier: Identifier::Numeric(id),
        }
    }

    pub fn string(namespace: u16, name: impl Into<String>) -> Self {
        Self {
            namespace,
            identifier: Identifier::String(name.into()),
        }
    }

    /// Id of a store entity (a memory or a block) called `name`.
    ///
    /// The identifier carries [`ENTITY_MARK`] in front, which no fixed node
    /// name starts with, so an entity can share its partition with fixed
    /// nodes of any name.
    pub fn entity(namespace: u16, name: &str) -> Self {
        Self::string(namespace, format!("{}{}", ENTITY_MARK, name))
    }

    /// The string identifier, if this is a named node.
    pub fn name(&self) -> Option<&str> {
        match &self.identifier {
            Identifier::String(s) => Some(s),
            Identifier::Numeric(_) => None,
        }
    }

    /// The entity name behind an id built with [`NodeId::entity`].
    pub fn entity_name(&self) -> Option<&str> {
        self.name().and_then(|s| s.strip_prefix(ENTITY_MARK))
    }
}

/// Leading character of entity identifiers.
pub const ENTITY_MARK: char = '#';

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace != 0 {
            write!(f, "ns={};", self.namespace)?;
        }
        match &self.identifier {
            Identifier::Numeric(n) => write!(f, "i={}", n),
            Identifier::String(s) => write!(f, "s={}", s),
        }
    }
}

/// Well-known nodes of the standard namespace.
pub mod ids {
    use super::NodeId;

    pub const OBJECTS_FOLDER: NodeId = NodeId::numeric(0, 85);

    // Type definitions
    pub const FOLDER_TYPE: NodeId = NodeId::numeric(0, 61);
    pub const BASE_OBJECT_TYPE: NodeId = NodeId::numeric(0, 58);
    pub const BASE_DATA_VARIABLE_TYPE: NodeId = NodeId::numeric(0, 63);
    pub const PROPERTY_TYPE: NodeId = NodeId::numeric(0, 68);
    pub const METHOD_NODE: NodeId = NodeId::numeric(0, 276);

    // Reference types
    pub const ORGANIZES: NodeId = NodeId::numeric(0, 35);
    pub const HAS_COMPONENT: NodeId = NodeId::numeric(0, 47);
    pub const HAS_PROPERTY: NodeId = NodeId::numeric(0, 46);
    pub const HAS_TYPE_DEFINITION: NodeId = NodeId::numeric(0, 40);

    // Data types
    pub const BOOLEAN: NodeId = NodeId::numeric(0, 1);
    pub const STRING: NodeId = NodeId::numeric(0, 12);
    pub const DATE_TIME: NodeId = NodeId::numeric(0, 13);
    pub const LOCALIZED_TEXT: NodeId = NodeId::numeric(0, 21);
    pub const STRUCTURE: NodeId = NodeId::numeric(0, 22);
    pub const ARGUMENT: NodeId = NodeId::numeric(0, 296);
}
