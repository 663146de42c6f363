//! # oms-bridge
//!
//! Assembles a store client and the address space over it. The binary
//! walks the result and prints it, which is the quickest way to see what a
//! protocol client browsing the bridge would get.

pub mod config;
pub mod demo;
pub mod error;
pub mod logging;

use std::sync::Arc;

use oms_address_space::{walk, NodeManagerTable, OmsBridge, TreeNode};
use oms_client::{ObjectMemoryStore, ReqwestExecutor, RestOmsClient};

pub use config::{BridgeConfig, ConfigLayer};
pub use error::{ConfigError, Error};

/// REST client for the configured server.
pub fn connect(config: &BridgeConfig) -> Result<Arc<dyn ObjectMemoryStore>, Error> {
    let executor = ReqwestExecutor::new(config.request_timeout())?;
    let client = RestOmsClient::with_executor(&config.oms_url, executor)?;
    Ok(Arc::new(client))
}

/// A fresh node manager table with the root bridge over `store` installed.
pub fn assemble(
    config: &BridgeConfig,
    store: Arc<dyn ObjectMemoryStore>,
) -> Result<(Arc<NodeManagerTable>, Arc<OmsBridge>), Error> {
    let table = NodeManagerTable::new();
    let root = OmsBridge::install(&table, store, &config.namespace_uri, config.block_policy())?;
    Ok((table, root))
}

/// The address space over `store`, walked to the configured depth.
pub fn inspect(config: &BridgeConfig, store: Arc<dyn ObjectMemoryStore>) -> Result<TreeNode, Error> {
    let (table, root) = assemble(config, store)?;
    Ok(walk(&table, root.root_id(), config.walk_depth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oms_client::InMemoryOms;

    #[test]
    fn test_inspect_demo_store() {
        let config = BridgeConfig {
            walk_depth: 3,
            ..Default::default()
        };
        let tree = inspect(&config, Arc::new(demo::seeded_store().unwrap())).unwrap();
        assert_eq!(tree.browse_name, "OMS");

        let arm = tree.child("robot-arm").unwrap();
        assert!(arm.child("Owner").is_some());
        let manual = arm.child("1").unwrap();
        let title = manual.child("Title").unwrap();
        assert_eq!(
            title.value.as_ref().and_then(|v| v.as_text()),
            Some("de: Handbuch\nen: Manual\n")
        );
        let datasheet = arm.child("2").unwrap();
        assert!(datasheet.child("Link").is_some());
        assert!(datasheet.child("Payload").is_none());
    }

    #[test]
    fn test_block_policy_reaches_blocks() {
        let config = BridgeConfig {
            block_deletable: false,
            ..Default::default()
        };
        let tree = inspect(&config, Arc::new(demo::seeded_store().unwrap())).unwrap();
        let manual = tree.child("robot-arm").and_then(|m| m.child("1")).unwrap();
        assert!(manual.child("Delete Block").is_none());
        assert!(manual.child("ID").is_some());
    }

    #[test]
    fn test_unreachable_store_still_walks_root() {
        let store = InMemoryOms::new();
        store.set_unreachable(true);
        let tree = inspect(&BridgeConfig::default(), Arc::new(store)).unwrap();
        let names: Vec<_> = tree.children.iter().map(|c| c.browse_name.as_str()).collect();
        assert_eq!(names, vec!["Create new OMM"]);
    }

    #[test]
    fn test_connect_rejects_bad_url() {
        let config = BridgeConfig {
            oms_url: "::".to_string(),
            ..Default::default()
        };
        assert!(matches!(connect(&config), Err(Error::Client(_))));
    }
}
