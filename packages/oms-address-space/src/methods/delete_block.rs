//! Delete Block: remove one block from its memory.

use std::sync::Arc;

use oms_client::ObjectMemoryStore;

use super::{BoundCall, Procedure};
use crate::error::BridgeError;
use crate::variant::{Argument, Variant};

/// Deletes the block the method is attached to.
pub struct DeleteBlock {
    store: Arc<dyn ObjectMemoryStore>,
    memory: String,
    block: String,
}

impl DeleteBlock {
    pub fn new(
        store: Arc<dyn ObjectMemoryStore>,
        memory: impl Into<String>,
        block: impl Into<String>,
    ) -> Self {
        Self {
            store,
            memory: memory.into(),
            block: block.into(),
        }
    }
}

impl Procedure for DeleteBlock {
    fn name(&self) -> &'static str {
        "Delete Block"
    }

    fn description(&self) -> &'static str {
        "Delete this block from its memory"
    }

    fn input_arguments(&self) -> Vec<Argument> {
        Vec::new()
    }

    fn run(&self, call: &BoundCall) -> Result<Option<Vec<Variant>>, BridgeError> {
        self.store.delete_block(
            &self.memory,
            &self.block,
            call.caller.credentials().as_ref(),
        )?;
        Ok(None)
    }
}
