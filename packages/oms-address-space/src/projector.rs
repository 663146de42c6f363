//! Projection of block metadata onto node values.
//!
//! Every field has a plain-text projection. Search matches against the same
//! text that clients read.

use std::fmt::Write;

use oms_client::{Block, BlockFormat, Entity, MultiLangText};

use crate::variant::{LocalizedText, Variant};

/// The fixed metadata fields of a block, by node name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockField {
    Contributors,
    Creator,
    Description,
    Format,
    Id,
    Link,
    Namespace,
    Payload,
    PrimaryId,
    Subject,
    Title,
    Type,
}

impl BlockField {
    pub const ALL: [BlockField; 12] = [
        BlockField::Contributors,
        BlockField::Creator,
        BlockField::Description,
        BlockField::Format,
        BlockField::Id,
        BlockField::Link,
        BlockField::Namespace,
        BlockField::Payload,
        BlockField::PrimaryId,
        BlockField::Subject,
        BlockField::Title,
        BlockField::Type,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BlockField::Contributors => "Contributors",
            BlockField::Creator => "Creator",
            BlockField::Description => "Description",
            BlockField::Format => "Format",
            BlockField::Id => "ID",
            BlockField::Link => "Link",
            BlockField::Namespace => "Namespace",
            BlockField::Payload => "Payload",
            BlockField::PrimaryId => "PrimaryID",
            BlockField::Subject => "Subject",
            BlockField::Title => "Title",
            BlockField::Type => "Type",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

/// Plain-text projection of one field.
pub fn project(block: &Block, field: BlockField) -> String {
    match field {
        BlockField::Contributors => block
            .contributors
            .iter()
            .map(|c| format!("{}\n", entity_text(c)))
            .collect(),
        BlockField::Creator => block.creator.as_ref().map(entity_text).unwrap_or_default(),
        BlockField::Description => multi_lang_text(&block.description),
        BlockField::Format => block.format.as_ref().map(format_text).unwrap_or_default(),
        BlockField::Id => block.id.clone(),
        // only link blocks have a meaningful Link
        BlockField::Link => match &block.link {
            Some(link) if block.is_link_block() => link.url.clone(),
            _ => String::new(),
        },
        BlockField::Namespace => block.namespace.clone().unwrap_or_default(),
        BlockField::Payload => block
            .payload
            .as_ref()
            .map(|p| p.value.clone())
            .unwrap_or_default(),
        BlockField::PrimaryId => block.primary_id.clone().unwrap_or_default(),
        BlockField::Subject => block
            .subject
            .iter()
            .map(|s| format!("{}\n", s.value))
            .collect(),
        BlockField::Title => multi_lang_text(&block.title),
        BlockField::Type => block.block_type.clone().unwrap_or_default(),
    }
}

/// Node value of one field.
pub fn field_value(block: &Block, field: BlockField) -> Variant {
    let text = project(block, field);
    match field {
        BlockField::Title | BlockField::Description => {
            Variant::LocalizedText(LocalizedText::new("", text))
        }
        _ => Variant::String(text),
    }
}

/// `"{locale}: {text}\n"` per entry.
pub fn multi_lang_text(text: &MultiLangText) -> String {
    let mut out = String::new();
    for (locale, value) in text.iter() {
        let _ = writeln!(out, "{}: {}", locale, value);
    }
    out
}

pub fn entity_text(entity: &Entity) -> String {
    match entity.date {
        Some(date) => format!("{}: {} ({})", entity.kind, entity.value, date.to_rfc3339()),
        None => format!("{}: {}", entity.kind, entity.value),
    }
}

pub fn format_text(format: &BlockFormat) -> String {
    let mut out = format.mime_type.clone();
    if let Some(schema) = &format.schema {
        let _ = write!(out, "; schema={}", schema);
    }
    if let Some(encoding) = &format.encoding {
        let _ = write!(out, "; encoding={}", encoding);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use oms_client::{Link, SubjectTag, TypedValue};

    fn sample() -> Block {
        let mut block = Block::new("4");
        block.title = [("en", "Hello"), ("de", "Hallo")].into_iter().collect();
        block.creator = Some(
            Entity::new("email", "a@b.c")
                .with_date(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()),
        );
        block.contributors = vec![Entity::new("email", "a@b.c"), Entity::new("email", "d@e.f")];
        block.format = Some(BlockFormat {
            mime_type: "text/plain".to_string(),
            schema: None,
            encoding: Some("UTF-8".to_string()),
        });
        block.subject = vec![SubjectTag {
            kind: "text".to_string(),
            value: "robot".to_string(),
        }];
        block.payload = Some(TypedValue::text("42"));
        block.link = Some(Link::url("http://example.com"));
        block
    }

    #[test]
    fn title_is_one_line_per_locale() {
        assert_eq!(project(&sample(), BlockField::Title), "de: Hallo\nen: Hello\n");
        assert_eq!(project(&sample(), BlockField::Description), "");
    }

    #[test]
    fn entities_include_date_when_known() {
        let block = sample();
        assert_eq!(
            project(&block, BlockField::Creator),
            "email: a@b.c (2024-05-01T10:00:00+00:00)"
        );
        assert_eq!(
            project(&block, BlockField::Contributors),
            "email: a@b.c\nemail: d@e.f\n"
        );
    }

    #[test]
    fn scalar_fields() {
        let block = sample();
        assert_eq!(project(&block, BlockField::Id), "4");
        assert_eq!(project(&block, BlockField::Format), "text/plain; encoding=UTF-8");
        assert_eq!(project(&block, BlockField::Subject), "robot\n");
        assert_eq!(project(&block, BlockField::Payload), "42");
        assert_eq!(project(&block, BlockField::Namespace), "");
    }

    #[test]
    fn link_is_empty_unless_link_block() {
        let mut block = sample();
        assert_eq!(project(&block, BlockField::Link), "");
        block.payload = None;
        assert_eq!(project(&block, BlockField::Link), "http://example.com");
    }

    #[test]
    fn texts_are_localized_values() {
        let block = sample();
        assert!(matches!(
            field_value(&block, BlockField::Title),
            Variant::LocalizedText(_)
        ));
        assert_eq!(
            field_value(&block, BlockField::Payload),
            Variant::String("42".to_string())
        );
    }

    #[test]
    fn names_round_trip() {
        for field in BlockField::ALL {
            assert_eq!(BlockField::from_name(field.name()), Some(field));
        }
        assert_eq!(BlockField::from_name("Owner"), None);
    }
}
