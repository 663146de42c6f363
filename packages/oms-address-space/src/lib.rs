//! # oms-address-space
//!
//! Presents an object memory server as a browsable address space: typed
//! nodes connected by typed references, with readable and writable values
//! and methods that act on the server.
//!
//! Nothing is materialized up front. Each level of the store hierarchy
//! (server, memory, block) is served by a bridge that owns one namespace
//! and answers requests from the store's current contents.
//!
//! ```ignore
//! use std::sync::Arc;
//! use oms_address_space::{walk, BlockPolicy, NodeManagerTable, OmsBridge};
//! use oms_client::RestOmsClient;
//!
//! let table = NodeManagerTable::new();
//! let store = Arc::new(RestOmsClient::new("http://localhost:10082")?);
//! let root = OmsBridge::install(&table, store, "DE/DFKI/OPCUA/OMS", BlockPolicy::default())?;
//! println!("{}", walk(&table, root.root_id(), 3));
//! ```

pub mod attributes;
pub mod bridges;
pub mod error;
pub mod manager;
pub mod methods;
pub mod namespace;
pub mod node_id;
pub mod projector;
pub mod reference;
pub mod variant;
pub mod walk;

pub use attributes::{AttributeId, NodeDescriptor};
pub use bridges::{BlockBridge, BlockPolicy, BridgeContext, MemoryBridge, OmsBridge};
pub use error::BridgeError;
pub use manager::{IoManager, NodeManager, NodeManagerTable, UserIdentity};
pub use methods::{CallPhase, MethodDescriptor, Procedure};
pub use namespace::NamespaceTable;
pub use node_id::{ids, Identifier, NodeId};
pub use reference::{Reference, ReferenceBuilder};
pub use variant::{Argument, DataValue, LocalizedText, NodeClass, QualifiedName, StatusCode, Variant};
pub use walk::{walk, TreeNode};
