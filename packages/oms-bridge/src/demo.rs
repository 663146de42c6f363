//! Sample memories for running the bridge without a server.

use chrono::{TimeZone, Utc};
use oms_client::{
    Block, BlockFormat, Entity, InMemoryOms, Link, MultiLangText, ObjectMemoryStore,
    OwnerCredentials, SubjectTag, TypedValue,
};

use crate::error::Error;

/// An in-memory store with two memories: one with an inline block and a
/// link block, one empty.
pub fn seeded_store() -> Result<InMemoryOms, Error> {
    let store = InMemoryOms::new();
    let owner = OwnerCredentials::new("Demo", "demo", "");
    store.create_memory("robot-arm", &owner, None)?;
    store.create_memory("conveyor", &owner, None)?;

    let created = Utc
        .with_ymd_and_hms(2024, 3, 1, 9, 30, 0)
        .single()
        .unwrap_or_else(Utc::now);
    let creator = Entity::new("email", "demo@example.com").with_date(created);

    let mut manual = Block::new("1");
    manual.namespace = Some("urn:demo:manual".to_string());
    manual.format = Some(BlockFormat {
        mime_type: "text/plain".to_string(),
        schema: None,
        encoding: Some("UTF-8".to_string()),
    });
    manual.title = [("en", "Manual"), ("de", "Handbuch")].into_iter().collect();
    manual.description = MultiLangText::single("en", "Operating instructions");
    manual.creator = Some(creator.clone());
    manual.contributors = vec![creator.clone()];
    manual.subject = vec![SubjectTag {
        kind: "text".to_string(),
        value: "maintenance".to_string(),
    }];
    manual.payload = Some(TypedValue::text("Lubricate joints monthly."));
    store.create_block("robot-arm", &manual, None)?;

    let mut datasheet = Block::new("2");
    datasheet.title = MultiLangText::single("en", "Datasheet");
    datasheet.creator = Some(creator);
    datasheet.link = Some(Link::url("http://example.com/robot-arm/datasheet.pdf"));
    store.create_block("robot-arm", &datasheet, None)?;

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_store() {
        let store = seeded_store().unwrap();
        assert_eq!(store.memory_names().unwrap(), vec!["conveyor", "robot-arm"]);
        let blocks = store.blocks("robot-arm").unwrap();
        assert_eq!(blocks.len(), 2);
        assert!(!blocks[0].is_link_block());
        assert!(blocks[1].is_link_block());
        assert!(store.blocks("conveyor").unwrap().is_empty());
    }
}
