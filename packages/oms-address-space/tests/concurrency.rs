use std::sync::{Arc, Barrier};
use std::thread;

use oms_address_space::{
    ids, BlockPolicy, BridgeError, NodeManagerTable, OmsBridge, UserIdentity, Variant,
};
use oms_client::{Block, InMemoryOms, ObjectMemoryStore, OwnerCredentials};

const URI: &str = "urn:test:oms";
const THREADS: usize = 8;

fn store_with(memories: &[&str]) -> Arc<InMemoryOms> {
    let store = Arc::new(InMemoryOms::new());
    for name in memories {
        store
            .create_memory(name, &OwnerCredentials::new("Owner", "", ""), None)
            .unwrap();
    }
    store
}

fn strings(items: &[&str]) -> Variant {
    Variant::StringArray(items.iter().map(|s| s.to_string()).collect())
}

#[test]
fn racing_browses_create_one_bridge_per_memory() {
    let store = store_with(&["alpha", "beta", "gamma"]);
    for name in ["alpha", "beta"] {
        store.create_block(name, &Block::new("1"), None).unwrap();
    }
    let table = NodeManagerTable::new();
    let root = OmsBridge::install(&table, store, URI, BlockPolicy::default()).unwrap();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let table = Arc::clone(&table);
            let root = Arc::clone(&root);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let refs = table.browse(root.root_id()).unwrap();
                let memories: Vec<_> = refs
                    .iter()
                    .filter(|r| r.reference_type == ids::ORGANIZES && r.source == *root.root_id())
                    .map(|r| r.target.clone())
                    .collect();
                for memory in &memories {
                    table.browse(memory).unwrap();
                }
                memories
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for memories in &results {
        assert_eq!(memories, &results[0]);
    }

    // root, three memories, two blocks
    assert_eq!(table.manager_count(), 6);
    for name in ["alpha", "beta", "gamma"] {
        assert!(root.memory(name).is_some());
    }
    // the standard namespace, the root and one per bridge
    assert_eq!(table.namespaces().len(), 7);
}

#[test]
fn concurrent_deletes_of_one_memory() {
    let store = store_with(&["alpha"]);
    let table = NodeManagerTable::new();
    let root = OmsBridge::install(&table, store.clone(), URI, BlockPolicy::default()).unwrap();
    table.browse(root.root_id()).unwrap();
    let memory = root.memory("alpha").unwrap();
    let folder = memory.folder_id().clone();
    let delete = memory.method("Delete OMM").unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let table = Arc::clone(&table);
            let barrier = Arc::clone(&barrier);
            let folder = folder.clone();
            let delete = delete.clone();
            thread::spawn(move || {
                barrier.wait();
                table.call(&UserIdentity::Anonymous, &folder, &delete, &[])
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(BridgeError::RemoteOperationFailed {
            status: Some(404),
            ..
        })
    )));
    assert!(store.memory_names().unwrap().is_empty());
}

#[test]
fn concurrent_block_creation_yields_distinct_ids() {
    let store = store_with(&["alpha"]);
    let table = NodeManagerTable::new();
    let root = OmsBridge::install(&table, store.clone(), URI, BlockPolicy::default()).unwrap();
    table.browse(root.root_id()).unwrap();
    let memory = root.memory("alpha").unwrap();
    let folder = memory.folder_id().clone();
    let create = memory.method("Create new Block").unwrap();

    let args: Vec<Variant> = vec![
        "".into(),
        strings(&["", "", ""]),
        strings(&["", ""]),
        strings(&[]),
        strings(&[]),
        "".into(),
        "".into(),
        "x".into(),
        strings(&["", "", ""]),
    ];

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let table = Arc::clone(&table);
            let folder = folder.clone();
            let create = create.clone();
            let args = args.clone();
            thread::spawn(move || table.call(&UserIdentity::Anonymous, &folder, &create, &args))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    // the descriptor lock serializes id assignment
    let mut block_ids: Vec<_> = store.blocks("alpha").unwrap().into_iter().map(|b| b.id).collect();
    block_ids.sort();
    assert_eq!(block_ids, vec!["1", "2", "3", "4"]);
}
