//! Create new OMM: create a memory with an owner.

use std::sync::Arc;

use oms_client::{ObjectMemoryStore, OwnerCredentials};

use super::{BoundCall, Procedure};
use crate::error::BridgeError;
use crate::manager::UserIdentity;
use crate::variant::{Argument, StatusCode, Variant};

/// Creates a new memory on the server.
///
/// Empty owner fields are filled from the caller's identity.
pub struct CreateMemory {
    store: Arc<dyn ObjectMemoryStore>,
}

impl CreateMemory {
    pub fn new(store: Arc<dyn ObjectMemoryStore>) -> Self {
        Self { store }
    }
}

fn owner_for(call: &BoundCall) -> OwnerCredentials {
    let (user, password) = match &call.caller {
        UserIdentity::UserName { username, password } => (username.as_str(), password.as_str()),
        UserIdentity::Anonymous => ("", ""),
    };
    let or_else = |value: &str, fallback: &str| {
        if value.is_empty() {
            fallback.to_string()
        } else {
            value.to_string()
        }
    };
    OwnerCredentials {
        name: or_else(call.string(1), user),
        username: or_else(call.string(2), user),
        password: or_else(call.string(3), password),
    }
}

impl Procedure for CreateMemory {
    fn name(&self) -> &'static str {
        "Create new OMM"
    }

    fn description(&self) -> &'static str {
        "Create a new object memory on the server"
    }

    fn input_arguments(&self) -> Vec<Argument> {
        vec![
            Argument::string("Memory name", "Name of the new memory"),
            Argument::string("Owner", "Cleartext name of the owner"),
            Argument::string("Username", "Username of the owner"),
            Argument::string("Password", "Password of the owner"),
        ]
    }

    fn run(&self, call: &BoundCall) -> Result<Option<Vec<Variant>>, BridgeError> {
        let name = call.string(0).trim();
        if name.is_empty() {
            return Err(BridgeError::argument(
                StatusCode::BadInvalidArgument,
                "memory name must not be empty",
            ));
        }
        let owner = owner_for(call);
        self.store
            .create_memory(name, &owner, call.caller.credentials().as_ref())?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oms_client::InMemoryOms;

    #[test]
    fn owner_falls_back_to_caller() {
        let call = BoundCall::new(
            vec!["alpha".into(), "".into(), "".into(), "".into()],
            UserIdentity::user("alice", "pw"),
        );
        assert_eq!(owner_for(&call), OwnerCredentials::new("alice", "alice", "pw"));

        let call = BoundCall::new(
            vec!["alpha".into(), "Bob".into(), "bob".into(), "x".into()],
            UserIdentity::user("alice", "pw"),
        );
        assert_eq!(owner_for(&call), OwnerCredentials::new("Bob", "bob", "x"));
    }

    #[test]
    fn creates_memory() {
        let store = Arc::new(InMemoryOms::new());
        let procedure = CreateMemory::new(store.clone());
        let call = BoundCall::new(
            vec!["alpha".into(), "Alice".into(), "".into(), "".into()],
            UserIdentity::Anonymous,
        );
        procedure.run(&call).unwrap();
        assert_eq!(store.memory_names().unwrap(), vec!["alpha"]);
        assert_eq!(store.owner("alpha").unwrap(), "Alice");
    }

    #[test]
    fn empty_name_is_rejected() {
        let store = Arc::new(InMemoryOms::new());
        let procedure = CreateMemory::new(store.clone());
        let call = BoundCall::new(
            vec!["  ".into(), "".into(), "".into(), "".into()],
            UserIdentity::Anonymous,
        );
        let err = procedure.run(&call).unwrap_err();
        assert_eq!(err.status(), StatusCode::BadInvalidArgument);
        assert!(store.memory_names().unwrap().is_empty());
    }
}
