//! The store-facing contract the address space is built on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::{Block, Link, MultiLangText, TypedValue};

/// Username/password pair forwarded with mutating calls.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keep passwords out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Owner of a memory, as stored by the server.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerCredentials {
    /// Cleartext display name.
    pub name: String,
    pub username: String,
    pub password: String,
}

impl OwnerCredentials {
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for OwnerCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnerCredentials")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// A single writable block field and its new content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockFieldUpdate {
    Description(MultiLangText),
    Title(MultiLangText),
    Payload(TypedValue),
    Link(Link),
}

impl BlockFieldUpdate {
    /// Path segment naming the field on the server.
    pub fn field_name(&self) -> &'static str {
        match self {
            BlockFieldUpdate::Description(_) => "description",
            BlockFieldUpdate::Title(_) => "title",
            BlockFieldUpdate::Payload(_) => "payload",
            BlockFieldUpdate::Link(_) => "link",
        }
    }

    /// Apply the update to a local copy of the block.
    pub fn apply_to(self, block: &mut Block) {
        match self {
            BlockFieldUpdate::Description(text) => block.description = text,
            BlockFieldUpdate::Title(text) => block.title = text,
            BlockFieldUpdate::Payload(value) => block.payload = Some(value),
            BlockFieldUpdate::Link(link) => block.link = Some(link),
        }
    }
}

/// Access to an object memory server.
///
/// Every call is a synchronous round trip; implementations hold no cache.
pub trait ObjectMemoryStore: Send + Sync {
    /// Names of all memories hosted by the server.
    fn memory_names(&self) -> Result<Vec<String>, Error>;

    /// Cleartext owner name of a memory.
    fn owner(&self, memory: &str) -> Result<String, Error>;

    /// All blocks of a memory, with metadata.
    fn blocks(&self, memory: &str) -> Result<Vec<Block>, Error>;

    fn block(&self, memory: &str, id: &str) -> Result<Option<Block>, Error> {
        Ok(self.blocks(memory)?.into_iter().find(|b| b.id == id))
    }

    fn block_last_modified(
        &self,
        memory: &str,
        id: &str,
    ) -> Result<Option<DateTime<Utc>>, Error> {
        Ok(self.block(memory, id)?.and_then(|b| b.last_modified()))
    }

    fn create_memory(
        &self,
        name: &str,
        owner: &OwnerCredentials,
        credentials: Option<&Credentials>,
    ) -> Result<(), Error>;

    fn delete_memory(&self, name: &str, credentials: Option<&Credentials>) -> Result<(), Error>;

    fn create_block(
        &self,
        memory: &str,
        block: &Block,
        credentials: Option<&Credentials>,
    ) -> Result<(), Error>;

    fn delete_block(
        &self,
        memory: &str,
        id: &str,
        credentials: Option<&Credentials>,
    ) -> Result<(), Error>;

    /// Replace the matching ACL entries of a memory with `acl_xml`.
    fn set_acl(
        &self,
        memory: &str,
        acl_xml: &str,
        credentials: Option<&Credentials>,
    ) -> Result<(), Error>;

    fn set_owner(
        &self,
        memory: &str,
        owner: &OwnerCredentials,
        credentials: Option<&Credentials>,
    ) -> Result<(), Error>;

    fn update_block_field(
        &self,
        memory: &str,
        id: &str,
        update: BlockFieldUpdate,
        credentials: Option<&Credentials>,
    ) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_passwords() {
        let creds = Credentials::new("alice", "hunter2");
        let owner = OwnerCredentials::new("Alice", "alice", "hunter2");
        assert!(!format!("{:?}", creds).contains("hunter2"));
        assert!(!format!("{:?}", owner).contains("hunter2"));
    }

    #[test]
    fn field_update_applies_locally() {
        let mut block = Block::new("1");
        BlockFieldUpdate::Payload(TypedValue::text("v")).apply_to(&mut block);
        BlockFieldUpdate::Title(MultiLangText::single("en", "T")).apply_to(&mut block);
        assert_eq!(block.payload, Some(TypedValue::text("v")));
        assert_eq!(block.title.get("en"), Some("T"));
        assert_eq!(BlockFieldUpdate::Link(Link::url("u")).field_name(), "link");
    }
}
