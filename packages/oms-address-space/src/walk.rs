//! Recursive browse of the address space, for inspection.

use std::fmt;

use crate::attributes::AttributeId;
use crate::manager::NodeManagerTable;
use crate::node_id::NodeId;
use crate::variant::{NodeClass, Variant};

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub node_id: NodeId,
    pub browse_name: String,
    pub class: Option<NodeClass>,
    /// Values of variable nodes that could be read.
    pub value: Option<Variant>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Number of nodes in this subtree, including itself.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }

    pub fn child(&self, browse_name: &str) -> Option<&TreeNode> {
        self.children.iter().find(|c| c.browse_name == browse_name)
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let class = self.class.map(|c| c.to_string()).unwrap_or_default();
        write!(f, "{:indent$}{} [{}]", "", self.browse_name, class, indent = depth * 2)?;
        if let Some(value) = &self.value {
            let text = value.to_string();
            let text = text.trim_end().replace('\n', " | ");
            write!(f, " = {}", text)?;
        }
        writeln!(f)?;
        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

/// Follow forward hierarchical references from `start`, at most
/// `max_depth` levels down. Nodes that fail to browse become leaves.
pub fn walk(table: &NodeManagerTable, start: &NodeId, max_depth: usize) -> TreeNode {
    let browse_name = match table.read(start, AttributeId::BrowseName).value {
        Variant::QualifiedName(q) => q.name,
        _ => start.to_string(),
    };
    let class = match table.read(start, AttributeId::NodeClass).value {
        Variant::NodeClass(c) => Some(c),
        _ => None,
    };
    let value = if class == Some(NodeClass::Variable) {
        let dv = table.read(start, AttributeId::Value);
        dv.is_good().then_some(dv.value)
    } else {
        None
    };

    let mut children = Vec::new();
    if max_depth > 0 {
        match table.browse(start) {
            Ok(references) => {
                for reference in references {
                    if reference.is_hierarchical() && reference.is_inverse(start) == Some(false) {
                        children.push(walk(table, &reference.target, max_depth - 1));
                    }
                }
            }
            Err(e) => tracing::debug!(node = %start, error = %e, "browse failed"),
        }
    }

    TreeNode {
        node_id: start.clone(),
        browse_name,
        class,
        value,
        children,
    }
}
