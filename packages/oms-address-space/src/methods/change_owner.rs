//! Change Owner: replace the owner of a memory.

use std::sync::Arc;

use oms_client::{ObjectMemoryStore, OwnerCredentials};

use super::{BoundCall, Procedure};
use crate::error::BridgeError;
use crate::variant::{Argument, Variant};

pub struct ChangeOwner {
    store: Arc<dyn ObjectMemoryStore>,
    memory: String,
}

impl ChangeOwner {
    pub fn new(store: Arc<dyn ObjectMemoryStore>, memory: impl Into<String>) -> Self {
        Self {
            store,
            memory: memory.into(),
        }
    }
}

impl Procedure for ChangeOwner {
    fn name(&self) -> &'static str {
        "Change Owner"
    }

    fn description(&self) -> &'static str {
        "Replace the owner of this object memory"
    }

    fn input_arguments(&self) -> Vec<Argument> {
        vec![
            Argument::string("Owner", "Cleartext name of the new owner"),
            Argument::string("Username", "Username of the new owner"),
            Argument::string("Password", "Password of the new owner"),
        ]
    }

    fn run(&self, call: &BoundCall) -> Result<Option<Vec<Variant>>, BridgeError> {
        let owner = OwnerCredentials::new(call.string(0), call.string(1), call.string(2));
        self.store
            .set_owner(&self.memory, &owner, call.caller.credentials().as_ref())?;
        Ok(None)
    }
}
