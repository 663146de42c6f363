//! Directed, typed edges between nodes.

use crate::node_id::{ids, NodeId};

/// An edge `source --reference_type--> target`.
///
/// The same edge is reported from both ends; seen from the target it is an
/// inverse reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub source: NodeId,
    pub target: NodeId,
    pub reference_type: NodeId,
}

impl Reference {
    pub fn new(source: NodeId, target: NodeId, reference_type: NodeId) -> Self {
        Self {
            source,
            target,
            reference_type,
        }
    }

    /// `Some(true)` when `viewpoint` is the target, `Some(false)` when it is
    /// the source, `None` when the edge does not touch it.
    pub fn is_inverse(&self, viewpoint: &NodeId) -> Option<bool> {
        if &self.source == viewpoint {
            Some(false)
        } else if &self.target == viewpoint {
            Some(true)
        } else {
            None
        }
    }

    /// The end of the edge that is not `viewpoint`.
    pub fn opposite(&self, viewpoint: &NodeId) -> Option<&NodeId> {
        match self.is_inverse(viewpoint)? {
            false => Some(&self.target),
            true => Some(&self.source),
        }
    }

    pub fn is_hierarchical(&self) -> bool {
        is_hierarchical_type(&self.reference_type)
    }

    pub fn is_type_definition(&self) -> bool {
        self.reference_type == ids::HAS_TYPE_DEFINITION
    }
}

pub fn is_hierarchical_type(reference_type: &NodeId) -> bool {
    *reference_type == ids::ORGANIZES
        || *reference_type == ids::HAS_COMPONENT
        || *reference_type == ids::HAS_PROPERTY
}

/// Collects the references of one node.
pub struct ReferenceBuilder {
    node: NodeId,
    references: Vec<Reference>,
}

impl ReferenceBuilder {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            references: Vec::new(),
        }
    }

    /// Edge from `parent` to this node.
    pub fn inverse(mut self, parent: NodeId, reference_type: NodeId) -> Self {
        self.references
            .push(Reference::new(parent, self.node.clone(), reference_type));
        self
    }

    pub fn type_definition(self, type_definition: NodeId) -> Self {
        self.forward(type_definition, ids::HAS_TYPE_DEFINITION)
    }

    /// Edge from this node to `target`.
    pub fn forward(mut self, target: NodeId, reference_type: NodeId) -> Self {
        self.references
            .push(Reference::new(self.node.clone(), target, reference_type));
        self
    }

    pub fn forward_all(
        mut self,
        targets: impl IntoIterator<Item = NodeId>,
        reference_type: NodeId,
    ) -> Self {
        for target in targets {
            self = self.forward(target, reference_type.clone());
        }
        self
    }

    pub fn build(self) -> Vec<Reference> {
        self.references
    }
}
