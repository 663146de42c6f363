//! The node-manager contract and the table the protocol runtime routes through.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use oms_client::Credentials;

use crate::attributes::{AttributeId, NodeDescriptor};
use crate::error::BridgeError;
use crate::namespace::NamespaceTable;
use crate::node_id::{ids, NodeId};
use crate::reference::{Reference, ReferenceBuilder};
use crate::variant::{DataValue, LocalizedText, NodeClass, QualifiedName, StatusCode, Variant};

/// Identity the protocol session authenticated the caller with.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum UserIdentity {
    #[default]
    Anonymous,
    UserName {
        username: String,
        password: String,
    },
}

impl UserIdentity {
    pub fn user(username: impl Into<String>, password: impl Into<String>) -> Self {
        UserIdentity::UserName {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Credentials to forward to the store, if any.
    pub fn credentials(&self) -> Option<Credentials> {
        match self {
            UserIdentity::Anonymous => None,
            UserIdentity::UserName { username, password } => {
                Some(Credentials::new(username.clone(), password.clone()))
            }
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            UserIdentity::Anonymous => None,
            UserIdentity::UserName { username, .. } => Some(username),
        }
    }
}

impl std::fmt::Debug for UserIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserIdentity::Anonymous => f.write_str("Anonymous"),
            UserIdentity::UserName { username, .. } => {
                f.debug_struct("UserName").field("username", username).finish()
            }
        }
    }
}

/// Attribute and value access for the nodes of one partition.
pub trait IoManager {
    fn read_descriptor(&self, id: &NodeId, attribute: AttributeId) -> DataValue;

    /// Current value of a variable node, fetched from the store.
    fn read_value(&self, id: &NodeId) -> DataValue;

    /// Push a new value to the store. Only a few block fields are writable.
    fn write_value(&self, caller: &UserIdentity, id: &NodeId, value: &Variant) -> StatusCode;
}

/// Owner of one namespace partition.
pub trait NodeManager: IoManager + Send + Sync {
    fn namespace_index(&self) -> u16;

    /// Descriptor of the node called `name` in this partition.
    fn describe(&self, name: &str) -> Option<NodeDescriptor>;

    /// All references of a node. Containers re-read their children from the
    /// store on every call.
    fn references(&self, id: &NodeId) -> Result<Vec<Reference>, BridgeError>;

    /// Run the procedure bound to `method`.
    ///
    /// Unknown methods yield `Ok(None)`.
    fn call_method(
        &self,
        caller: &UserIdentity,
        object: &NodeId,
        method: &NodeId,
        args: &[Variant],
    ) -> Result<Option<Vec<Variant>>, BridgeError>;

    /// The name of `id` if it lives in this partition.
    fn node_name<'a>(&self, id: &'a NodeId) -> Option<&'a str> {
        if id.namespace == self.namespace_index() {
            id.name()
        } else {
            None
        }
    }

    fn lookup(&self, id: &NodeId) -> Option<NodeDescriptor> {
        self.node_name(id).and_then(|name| self.describe(name))
    }

    fn has_node(&self, id: &NodeId) -> bool {
        self.lookup(id).is_some()
    }

    fn node_class(&self, id: &NodeId) -> Result<NodeClass, BridgeError> {
        self.lookup(id)
            .map(|d| d.class)
            .ok_or_else(|| BridgeError::not_found(id))
    }

    fn browse_name(&self, id: &NodeId) -> Result<QualifiedName, BridgeError> {
        let descriptor = self.lookup(id).ok_or_else(|| BridgeError::not_found(id))?;
        Ok(QualifiedName {
            namespace: id.namespace,
            name: descriptor.browse_name,
        })
    }

    /// Only English names exist; other locales fall back to them.
    fn display_name(&self, id: &NodeId, _locale: &str) -> Result<LocalizedText, BridgeError> {
        let descriptor = self.lookup(id).ok_or_else(|| BridgeError::not_found(id))?;
        Ok(LocalizedText::english(descriptor.browse_name))
    }

    fn type_definition(&self, id: &NodeId) -> Result<Option<NodeId>, BridgeError> {
        let descriptor = self.lookup(id).ok_or_else(|| BridgeError::not_found(id))?;
        Ok(Some(descriptor.type_definition))
    }

    /// Data type of a variable; `None` for other node classes.
    fn variable_data_type(&self, id: &NodeId) -> Result<Option<NodeId>, BridgeError> {
        let descriptor = self.lookup(id).ok_or_else(|| BridgeError::not_found(id))?;
        match descriptor.class {
            NodeClass::Variable => descriptor.data_type.map(Some).ok_or_else(|| {
                BridgeError::AttributeInvalid {
                    node: id.to_string(),
                    attribute: AttributeId::DataType,
                }
            }),
            _ => Ok(None),
        }
    }
}

/// All node managers, keyed by namespace index.
///
/// Requests are routed by the namespace of the node id. The table itself
/// answers for the standard Objects folder, which organizes the registered
/// object roots.
#[derive(Default)]
pub struct NodeManagerTable {
    namespaces: NamespaceTable,
    managers: RwLock<BTreeMap<u16, Arc<dyn NodeManager>>>,
    object_roots: RwLock<Vec<NodeId>>,
}

impl NodeManagerTable {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn namespaces(&self) -> &NamespaceTable {
        &self.namespaces
    }

    /// Register a manager for its namespace unless one is already there.
    ///
    /// Returns whether `manager` was inserted.
    pub fn register(&self, manager: Arc<dyn NodeManager>) -> bool {
        let index = manager.namespace_index();
        let mut managers = self.managers.write().unwrap_or_else(|e| e.into_inner());
        if managers.contains_key(&index) {
            return false;
        }
        managers.insert(index, manager);
        true
    }

    pub fn manager_for(&self, id: &NodeId) -> Option<Arc<dyn NodeManager>> {
        let managers = self.managers.read().unwrap_or_else(|e| e.into_inner());
        managers.get(&id.namespace).cloned()
    }

    pub fn manager_count(&self) -> usize {
        self.managers.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Make `node` a child of the Objects folder.
    pub fn add_object_root(&self, node: NodeId) {
        let mut roots = self.object_roots.write().unwrap_or_else(|e| e.into_inner());
        if !roots.contains(&node) {
            roots.push(node);
        }
    }

    pub fn browse(&self, id: &NodeId) -> Result<Vec<Reference>, BridgeError> {
        if *id == ids::OBJECTS_FOLDER {
            let roots = self
                .object_roots
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .clone();
            return Ok(ReferenceBuilder::new(ids::OBJECTS_FOLDER)
                .type_definition(ids::FOLDER_TYPE)
                .forward_all(roots, ids::ORGANIZES)
                .build());
        }
        let manager = self
            .manager_for(id)
            .ok_or_else(|| BridgeError::not_found(id))?;
        if !manager.has_node(id) {
            return Err(BridgeError::not_found(id));
        }
        manager.references(id)
    }

    pub fn read(&self, id: &NodeId, attribute: AttributeId) -> DataValue {
        match self.manager_for(id) {
            Some(manager) => manager.read_descriptor(id, attribute),
            None => DataValue::bad(StatusCode::BadNodeIdUnknown),
        }
    }

    pub fn write(&self, caller: &UserIdentity, id: &NodeId, value: &Variant) -> StatusCode {
        match self.manager_for(id) {
            Some(manager) => manager.write_value(caller, id, value),
            None => StatusCode::BadNodeIdUnknown,
        }
    }

    pub fn call(
        &self,
        caller: &UserIdentity,
        object: &NodeId,
        method: &NodeId,
        args: &[Variant],
    ) -> Result<Option<Vec<Variant>>, BridgeError> {
        match self.manager_for(method) {
            Some(manager) => manager.call_method(caller, object, method, args),
            None => Ok(None),
        }
    }
}
