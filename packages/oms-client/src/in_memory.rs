//! In-process object memory server.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Error;
use crate::model::Block;
use crate::store::{BlockFieldUpdate, Credentials, ObjectMemoryStore, OwnerCredentials};

#[derive(Debug, Clone, Default)]
struct MemoryRecord {
    owner: OwnerCredentials,
    acl: Vec<String>,
    blocks: Vec<Block>,
}

impl MemoryRecord {
    /// Owners with a password only accept calls carrying their credentials.
    fn authorize(&self, credentials: Option<&Credentials>) -> Result<(), Error> {
        if self.owner.password.is_empty() {
            return Ok(());
        }
        match credentials {
            Some(c) if c.username == self.owner.username && c.password == self.owner.password => {
                Ok(())
            }
            _ => Err(Error::Rejected {
                status: 401,
                message: "Unauthorized".to_string(),
            }),
        }
    }
}

/// `ObjectMemoryStore` kept entirely in memory.
///
/// Behaves like the REST server for the purposes of the bridge: duplicate
/// creates answer 409, unknown memories and blocks 404, and memories whose
/// owner has a password answer 401 to unauthenticated mutations.
#[derive(Debug, Default)]
pub struct InMemoryOms {
    memories: RwLock<BTreeMap<String, MemoryRecord>>,
    unreachable: AtomicBool,
}

impl InMemoryOms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a network outage: every call fails as `Unreachable`.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// ACL entries of a memory, least recently set first.
    pub fn acl(&self, memory: &str) -> Option<Vec<String>> {
        self.read().get(memory).map(|m| m.acl.clone())
    }

    fn check_reachable(&self) -> Result<(), Error> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(Error::Unreachable {
                message: "in-memory store switched offline".to_string(),
            });
        }
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, MemoryRecord>> {
        self.memories.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, MemoryRecord>> {
        self.memories.write().unwrap_or_else(|e| e.into_inner())
    }

    fn with_memory<T>(
        &self,
        memory: &str,
        f: impl FnOnce(&MemoryRecord) -> Result<T, Error>,
    ) -> Result<T, Error> {
        self.check_reachable()?;
        let memories = self.read();
        let record = memories.get(memory).ok_or_else(|| not_found(memory))?;
        f(record)
    }

    fn mutate_memory<T>(
        &self,
        memory: &str,
        credentials: Option<&Credentials>,
        f: impl FnOnce(&mut MemoryRecord) -> Result<T, Error>,
    ) -> Result<T, Error> {
        self.check_reachable()?;
        let mut memories = self.write();
        let record = memories.get_mut(memory).ok_or_else(|| not_found(memory))?;
        record.authorize(credentials)?;
        f(record)
    }
}

/// The `user` or `group` an ACL entry grants rights to.
fn acl_subject(entry: &str) -> Option<(&'static str, &str)> {
    ["user", "group"].into_iter().find_map(|attribute| {
        let marker = format!(" {}=\"", attribute);
        let start = entry.find(&marker)? + marker.len();
        let len = entry[start..].find('"')?;
        Some((attribute, &entry[start..start + len]))
    })
}

fn not_found(resource: &str) -> Error {
    Error::NotFound {
        resource: resource.to_string(),
    }
}

impl ObjectMemoryStore for InMemoryOms {
    fn memory_names(&self) -> Result<Vec<String>, Error> {
        self.check_reachable()?;
        Ok(self.read().keys().cloned().collect())
    }

    fn owner(&self, memory: &str) -> Result<String, Error> {
        self.with_memory(memory, |m| Ok(m.owner.name.clone()))
    }

    fn blocks(&self, memory: &str) -> Result<Vec<Block>, Error> {
        self.with_memory(memory, |m| Ok(m.blocks.clone()))
    }

    fn create_memory(
        &self,
        name: &str,
        owner: &OwnerCredentials,
        _credentials: Option<&Credentials>,
    ) -> Result<(), Error> {
        self.check_reachable()?;
        let mut memories = self.write();
        if memories.contains_key(name) {
            return Err(Error::Rejected {
                status: 409,
                message: format!("memory {} already exists", name),
            });
        }
        memories.insert(
            name.to_string(),
            MemoryRecord {
                owner: owner.clone(),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn delete_memory(&self, name: &str, credentials: Option<&Credentials>) -> Result<(), Error> {
        self.check_reachable()?;
        let mut memories = self.write();
        let record = memories.get(name).ok_or_else(|| not_found(name))?;
        record.authorize(credentials)?;
        memories.remove(name);
        Ok(())
    }

    fn create_block(
        &self,
        memory: &str,
        block: &Block,
        credentials: Option<&Credentials>,
    ) -> Result<(), Error> {
        self.mutate_memory(memory, credentials, |m| {
            if m.blocks.iter().any(|b| b.id == block.id) {
                return Err(Error::Rejected {
                    status: 409,
                    message: format!("block {} already exists", block.id),
                });
            }
            m.blocks.push(block.clone());
            Ok(())
        })
    }

    fn delete_block(
        &self,
        memory: &str,
        id: &str,
        credentials: Option<&Credentials>,
    ) -> Result<(), Error> {
        self.mutate_memory(memory, credentials, |m| {
            let before = m.blocks.len();
            m.blocks.retain(|b| b.id != id);
            if m.blocks.len() == before {
                return Err(not_found(id));
            }
            Ok(())
        })
    }

    fn set_acl(
        &self,
        memory: &str,
        acl_xml: &str,
        credentials: Option<&Credentials>,
    ) -> Result<(), Error> {
        let subject = acl_subject(acl_xml);
        self.mutate_memory(memory, credentials, |m| {
            // entries without a subject only replace identical ones
            m.acl.retain(|entry| match subject {
                Some(subject) => acl_subject(entry) != Some(subject),
                None => entry != acl_xml,
            });
            m.acl.push(acl_xml.to_string());
            Ok(())
        })
    }

    fn set_owner(
        &self,
        memory: &str,
        owner: &OwnerCredentials,
        credentials: Option<&Credentials>,
    ) -> Result<(), Error> {
        self.mutate_memory(memory, credentials, |m| {
            m.owner = owner.clone();
            Ok(())
        })
    }

    fn update_block_field(
        &self,
        memory: &str,
        id: &str,
        update: BlockFieldUpdate,
        credentials: Option<&Credentials>,
    ) -> Result<(), Error> {
        self.mutate_memory(memory, credentials, |m| {
            let block = m
                .blocks
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or_else(|| not_found(id))?;
            update.apply_to(block);
            Ok(())
        })
    }
}
