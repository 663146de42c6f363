//! Search for Block: match block fields against per-field queries.

use std::collections::BTreeSet;
use std::sync::Arc;

use oms_client::{Block, ObjectMemoryStore};

use super::{BoundCall, Procedure};
use crate::error::BridgeError;
use crate::projector::{project, BlockField};
use crate::variant::{Argument, Variant};

/// Query argument order.
const QUERY_FIELDS: [BlockField; 9] = [
    BlockField::Namespace,
    BlockField::Format,
    BlockField::Creator,
    BlockField::Title,
    BlockField::Description,
    BlockField::Type,
    BlockField::Subject,
    BlockField::Payload,
    BlockField::Link,
];

/// Finds blocks of a memory by substring queries on their fields.
///
/// A block matches if any non-empty query is contained in the projected
/// text of its field. Matching is case sensitive.
pub struct SearchBlock {
    store: Arc<dyn ObjectMemoryStore>,
    memory: String,
}

impl SearchBlock {
    pub fn new(store: Arc<dyn ObjectMemoryStore>, memory: impl Into<String>) -> Self {
        Self {
            store,
            memory: memory.into(),
        }
    }
}

/// Ids of blocks matching any of the `(field, query)` pairs.
pub fn matching_ids(blocks: &[Block], queries: &[(BlockField, &str)]) -> BTreeSet<String> {
    blocks
        .iter()
        .filter(|block| {
            queries
                .iter()
                .any(|(field, query)| project(block, *field).contains(query))
        })
        .map(|block| block.id.clone())
        .collect()
}

impl Procedure for SearchBlock {
    fn name(&self) -> &'static str {
        "Search for Block"
    }

    fn description(&self) -> &'static str {
        "Find blocks of this object memory by field contents"
    }

    fn input_arguments(&self) -> Vec<Argument> {
        QUERY_FIELDS
            .iter()
            .map(|field| Argument::string(field.name(), "Substring to search for, or empty"))
            .collect()
    }

    fn output_arguments(&self) -> Vec<Argument> {
        vec![Argument::string_list("Block IDs", "IDs of the matching blocks")]
    }

    fn run(&self, call: &BoundCall) -> Result<Option<Vec<Variant>>, BridgeError> {
        let queries: Vec<(BlockField, &str)> = QUERY_FIELDS
            .iter()
            .enumerate()
            .map(|(i, field)| (*field, call.string(i)))
            .filter(|(_, query)| !query.is_empty())
            .collect();
        if queries.is_empty() {
            return Ok(None);
        }

        // Searches are anonymous reads.
        let blocks = self.store.blocks(&self.memory)?;
        let ids = matching_ids(&blocks, &queries);
        if ids.is_empty() {
            return Ok(None);
        }
        Ok(Some(vec![Variant::StringArray(ids.into_iter().collect())]))
    }
}
