//! Domain model of an object memory: blocks and their metadata.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text keyed by locale tag ("en", "de", ...), kept in locale order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct MultiLangText(BTreeMap<String, String>);

impl MultiLangText {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single entry text.
    pub fn single(locale: impl Into<String>, text: impl Into<String>) -> Self {
        let mut out = Self::new();
        out.insert(locale, text);
        out
    }

    pub fn insert(&mut self, locale: impl Into<String>, text: impl Into<String>) {
        self.0.insert(locale.into(), text.into());
    }

    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0.get(locale).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(l, t)| (l.as_str(), t.as_str()))
    }
}

impl<L: Into<String>, T: Into<String>> FromIterator<(L, T)> for MultiLangText {
    fn from_iter<I: IntoIterator<Item = (L, T)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (locale, text) in iter {
            out.insert(locale, text);
        }
        out
    }
}

/// A person or agent, e.g. `{ kind: "email", value: "a@b.c" }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl Entity {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
            date: None,
        }
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlockFormat {
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

/// A value tagged with its content type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypedValue {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl TypedValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: "text/plain".to_string(),
            value: value.into(),
        }
    }
}

/// Reference to content stored outside the memory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl Link {
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            kind: "url".to_string(),
            url: url.into(),
            hash: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubjectTag {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// One block of an object memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<BlockFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<Entity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<Entity>,
    #[serde(default, skip_serializing_if = "MultiLangText::is_empty")]
    pub title: MultiLangText,
    #[serde(default, skip_serializing_if = "MultiLangText::is_empty")]
    pub description: MultiLangText,
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub block_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subject: Vec<SubjectTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<TypedValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
}

impl Block {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// A link block references external content instead of carrying a payload.
    pub fn is_link_block(&self) -> bool {
        self.link.is_some() && self.payload.is_none()
    }

    /// Date of the latest contribution, falling back to the creation date.
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        match self.contributors.last() {
            Some(contributor) => contributor.date,
            None => self.creator.as_ref().and_then(|c| c.date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn block_deserializes_from_camel_case() {
        let block: Block = serde_json::from_value(json!({
            "id": "1",
            "primaryId": "http://oms/rest/alpha",
            "format": { "mimeType": "text/plain" },
            "creator": { "type": "email", "value": "a@b.c", "date": "2024-05-01T10:00:00Z" },
            "title": { "en": "Hello", "de": "Hallo" },
            "type": "http://purl.org/dc/dcmitype/Text",
            "payload": { "type": "text/plain", "value": "42" }
        }))
        .unwrap();

        assert_eq!(block.id, "1");
        assert_eq!(block.primary_id.as_deref(), Some("http://oms/rest/alpha"));
        assert_eq!(block.format.unwrap().mime_type, "text/plain");
        assert_eq!(block.title.get("de"), Some("Hallo"));
        assert_eq!(
            block.block_type.as_deref(),
            Some("http://purl.org/dc/dcmitype/Text")
        );
        assert!(block.contributors.is_empty());
    }

    #[test]
    fn multi_lang_text_iterates_in_locale_order() {
        let text: MultiLangText = [("en", "Hello"), ("de", "Hallo")].into_iter().collect();
        let locales: Vec<_> = text.iter().map(|(l, _)| l).collect();
        assert_eq!(locales, vec!["de", "en"]);
    }

    #[test]
    fn link_block_requires_missing_payload() {
        let mut block = Block::new("1");
        assert!(!block.is_link_block());

        block.link = Some(Link::url("http://example.com/data"));
        assert!(block.is_link_block());

        block.payload = Some(TypedValue::text("inline"));
        assert!(!block.is_link_block());
    }

    #[test]
    fn last_modified_prefers_last_contributor() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let edited = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let mut block = Block::new("1");
        assert_eq!(block.last_modified(), None);

        block.creator = Some(Entity::new("email", "a@b.c").with_date(created));
        assert_eq!(block.last_modified(), Some(created));

        block.contributors = vec![
            Entity::new("email", "a@b.c").with_date(created),
            Entity::new("email", "d@e.f").with_date(edited),
        ];
        assert_eq!(block.last_modified(), Some(edited));
    }
}
