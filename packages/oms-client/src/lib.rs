//! # oms-client
//!
//! Client side of an object memory server (OMS).
//!
//! An OMS hosts named *memories*; each memory holds *blocks* carrying
//! metadata (creator, title, format, ...) and either an inline payload or a
//! link to external content.
//!
//! ```ignore
//! use oms_client::{ObjectMemoryStore, RestOmsClient};
//!
//! let client = RestOmsClient::new("http://localhost:10082")?;
//! for memory in client.memory_names()? {
//!     println!("{}: {} blocks", memory, client.blocks(&memory)?.len());
//! }
//! ```
//!
//! [`InMemoryOms`] implements the same trait without a server.

pub mod error;
pub mod executor;
pub mod in_memory;
pub mod model;
pub mod rest;
pub mod store;
pub mod types;

pub use error::Error;
pub use executor::{HttpExecutor, ReqwestExecutor};
pub use in_memory::InMemoryOms;
pub use model::{Block, BlockFormat, Entity, Link, MultiLangText, SubjectTag, TypedValue};
pub use rest::RestOmsClient;
pub use store::{BlockFieldUpdate, Credentials, ObjectMemoryStore, OwnerCredentials};
pub use types::{HttpRequest, HttpResponse, Method};
