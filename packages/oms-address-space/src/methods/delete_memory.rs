//! Delete OMM: remove the memory the method hangs off.

use std::sync::Arc;

use oms_client::ObjectMemoryStore;

use super::{BoundCall, Procedure};
use crate::error::BridgeError;
use crate::variant::{Argument, Variant};

/// Deletes the memory the method is attached to.
pub struct DeleteMemory {
    store: Arc<dyn ObjectMemoryStore>,
    memory: String,
}

impl DeleteMemory {
    pub fn new(store: Arc<dyn ObjectMemoryStore>, memory: impl Into<String>) -> Self {
        Self {
            store,
            memory: memory.into(),
        }
    }
}

impl Procedure for DeleteMemory {
    fn name(&self) -> &'static str {
        "Delete OMM"
    }

    fn description(&self) -> &'static str {
        "Delete this object memory"
    }

    fn input_arguments(&self) -> Vec<Argument> {
        Vec::new()
    }

    fn run(&self, call: &BoundCall) -> Result<Option<Vec<Variant>>, BridgeError> {
        self.store
            .delete_memory(&self.memory, call.caller.credentials().as_ref())?;
        Ok(None)
    }
}
