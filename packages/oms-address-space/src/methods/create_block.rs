//! Create new Block: build a block from its nine input arguments.

use std::sync::Arc;

use chrono::Utc;
use oms_client::{
    Block, BlockFormat, Entity, Link, MultiLangText, ObjectMemoryStore, SubjectTag, TypedValue,
};

use super::{BoundCall, Procedure};
use crate::error::BridgeError;
use crate::variant::{Argument, StatusCode, Variant};

/// Adds a block to the memory the method is attached to.
pub struct CreateBlock {
    store: Arc<dyn ObjectMemoryStore>,
    memory: String,
}

impl CreateBlock {
    pub fn new(store: Arc<dyn ObjectMemoryStore>, memory: impl Into<String>) -> Self {
        Self {
            store,
            memory: memory.into(),
        }
    }
}

/// Flat `[locale, text, locale, text, ...]` pairs. An empty locale means "en".
fn localized_pairs(name: &str, items: &[String]) -> Result<MultiLangText, BridgeError> {
    if items.len() % 2 != 0 {
        return Err(BridgeError::argument(
            StatusCode::BadInvalidArgument,
            format!("{} must consist of locale/text pairs", name),
        ));
    }
    Ok(items
        .chunks(2)
        .map(|pair| {
            let locale = if pair[0].is_empty() { "en" } else { pair[0].as_str() };
            (locale.to_string(), pair[1].clone())
        })
        .collect())
}

fn item(items: &[String], index: usize) -> &str {
    items.get(index).map(String::as_str).unwrap_or_default()
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Next free block id: one past the highest numeric id, and never below
/// the block count.
pub fn next_block_id(blocks: &[Block]) -> String {
    let highest = blocks
        .iter()
        .filter_map(|b| b.id.parse::<u64>().ok())
        .chain(std::iter::once(blocks.len() as u64))
        .max()
        .unwrap_or(0);
    (highest + 1).to_string()
}

/// Build the block described by the call, without an id.
fn block_from_call(call: &BoundCall) -> Result<Block, BridgeError> {
    let title = localized_pairs("Title", call.strings(3))?;
    let description = localized_pairs("Description", call.strings(4))?;

    let mut block = Block {
        namespace: non_empty(call.string(0)),
        title,
        description,
        block_type: non_empty(call.string(5)),
        ..Default::default()
    };

    let format = call.strings(1);
    if let Some(mime_type) = non_empty(item(format, 0)) {
        block.format = Some(BlockFormat {
            mime_type,
            schema: non_empty(item(format, 1)),
            encoding: non_empty(item(format, 2)),
        });
    }

    let creator = call.strings(2);
    if let Some(value) = non_empty(item(creator, 1)) {
        let entity = Entity::new(item(creator, 0), value).with_date(Utc::now());
        block.contributors = vec![entity.clone()];
        block.creator = Some(entity);
    }

    if let Some(subject) = non_empty(call.string(6)) {
        block.subject = vec![SubjectTag {
            kind: "text".to_string(),
            value: subject,
        }];
    }

    if let Some(payload) = non_empty(call.string(7)) {
        block.payload = Some(TypedValue::text(payload));
    }

    let link = call.strings(8);
    if let Some(url) = non_empty(item(link, 1)) {
        block.link = Some(Link {
            kind: non_empty(item(link, 0)).unwrap_or_else(|| "url".to_string()),
            url,
            hash: non_empty(item(link, 2)),
        });
    }

    Ok(block)
}

impl Procedure for CreateBlock {
    fn name(&self) -> &'static str {
        "Create new Block"
    }

    fn description(&self) -> &'static str {
        "Add a block to this object memory"
    }

    fn input_arguments(&self) -> Vec<Argument> {
        vec![
            Argument::string("Namespace", "Namespace URI of the block"),
            Argument::string_array("Format", 3, "MIME type, schema and encoding"),
            Argument::string_array("Creator", 2, "Creator type (e.g. email) and value"),
            Argument::string_list("Title", "Pairs of locale and title"),
            Argument::string_list("Description", "Pairs of locale and description"),
            Argument::string("Type", "Type URI of the block"),
            Argument::string("Subject", "Subject of the block"),
            Argument::string("Payload", "Inline payload"),
            Argument::string_array("Link", 3, "Link type, URL and hash"),
        ]
    }

    fn run(&self, call: &BoundCall) -> Result<Option<Vec<Variant>>, BridgeError> {
        let mut block = block_from_call(call)?;
        let existing = self.store.blocks(&self.memory)?;
        block.id = next_block_id(&existing);
        self.store
            .create_block(&self.memory, &block, call.caller.credentials().as_ref())?;
        tracing::debug!(memory = %self.memory, block = %block.id, "block created");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::UserIdentity;

    fn strings(items: &[&str]) -> Variant {
        Variant::StringArray(items.iter().map(|s| s.to_string()).collect())
    }

    fn call(title: &[&str]) -> BoundCall {
        BoundCall::new(
            vec![
                "urn:sample".into(),
                strings(&["text/plain", "", "UTF-8"]),
                strings(&["email", "a@b.c"]),
                strings(title),
                strings(&[]),
                "".into(),
                "robot".into(),
                "42".into(),
                strings(&["", "", ""]),
            ],
            UserIdentity::Anonymous,
        )
    }

    #[test]
    fn builds_block_from_arguments() {
        let block = block_from_call(&call(&["en", "Hello", "", "Hi"])).unwrap();
        assert_eq!(block.namespace.as_deref(), Some("urn:sample"));
        assert_eq!(block.format.as_ref().unwrap().schema, None);
        assert_eq!(block.format.as_ref().unwrap().encoding.as_deref(), Some("UTF-8"));
        assert_eq!(block.creator.as_ref().unwrap().value, "a@b.c");
        assert_eq!(block.contributors.len(), 1);
        // the empty locale collapses onto "en"
        assert_eq!(block.title.get("en"), Some("Hi"));
        assert_eq!(block.subject[0].value, "robot");
        assert_eq!(block.payload, Some(TypedValue::text("42")));
        assert_eq!(block.link, None);
        assert_eq!(block.block_type, None);
    }

    #[test]
    fn odd_title_is_rejected() {
        let err = block_from_call(&call(&["en"])).unwrap_err();
        assert_eq!(err.status(), StatusCode::BadInvalidArgument);
    }

    #[test]
    fn block_ids_skip_past_existing() {
        assert_eq!(next_block_id(&[]), "1");
        assert_eq!(next_block_id(&[Block::new("1"), Block::new("2")]), "3");
        // after a delete the count would collide with "3"
        assert_eq!(next_block_id(&[Block::new("1"), Block::new("3")]), "4");
        assert_eq!(next_block_id(&[Block::new("x"), Block::new("y")]), "3");
    }
}
