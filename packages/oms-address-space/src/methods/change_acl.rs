//! Change ACL: set an access control entry on a memory.

use std::sync::Arc;

use oms_client::ObjectMemoryStore;

use super::{BoundCall, Procedure};
use crate::error::BridgeError;
use crate::variant::{Argument, StatusCode, Variant};

/// Replaces matching ACL entries of a memory with an XML entry.
pub struct ChangeAcl {
    store: Arc<dyn ObjectMemoryStore>,
    memory: String,
}

impl ChangeAcl {
    pub fn new(store: Arc<dyn ObjectMemoryStore>, memory: impl Into<String>) -> Self {
        Self {
            store,
            memory: memory.into(),
        }
    }
}

impl Procedure for ChangeAcl {
    fn name(&self) -> &'static str {
        "Change ACL"
    }

    fn description(&self) -> &'static str {
        "Set an access control entry of this object memory"
    }

    fn input_arguments(&self) -> Vec<Argument> {
        vec![Argument::string("ACL", "XML access control entry")]
    }

    fn run(&self, call: &BoundCall) -> Result<Option<Vec<Variant>>, BridgeError> {
        let acl = call.string(0).trim();
        if acl.is_empty() {
            return Err(BridgeError::argument(
                StatusCode::BadInvalidArgument,
                "ACL entry must not be empty",
            ));
        }
        self.store
            .set_acl(&self.memory, acl, call.caller.credentials().as_ref())?;
        Ok(None)
    }
}
