//! Values exchanged with clients: variants, data values and status codes.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};

use crate::node_id::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    Object,
    Variable,
    Method,
}

impl fmt::Display for NodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeClass::Object => "Object",
            NodeClass::Variable => "Variable",
            NodeClass::Method => "Method",
        };
        f.write_str(s)
    }
}

/// Text tagged with a locale. An empty locale is the invariant locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedText {
    pub locale: String,
    pub text: String,
}

impl LocalizedText {
    pub fn new(locale: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            text: text.into(),
        }
    }

    pub fn english(text: impl Into<String>) -> Self {
        Self::new("en", text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub namespace: u16,
    pub name: String,
}

/// One entry of a method's argument schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub data_type: NodeId,
    /// -1 for scalars, 1 for one-dimensional arrays.
    pub value_rank: i32,
    /// Fixed array length, or empty when any length is accepted.
    pub array_dimensions: Vec<u32>,
    pub description: String,
}

impl Argument {
    pub fn string(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: crate::node_id::ids::STRING,
            value_rank: -1,
            array_dimensions: Vec::new(),
            description: description.to_string(),
        }
    }

    /// A string array of exactly `len` elements.
    pub fn string_array(name: &str, len: u32, description: &str) -> Self {
        Self {
            value_rank: 1,
            array_dimensions: vec![len],
            ..Self::string(name, description)
        }
    }

    /// A string array of any length.
    pub fn string_list(name: &str, description: &str) -> Self {
        Self {
            value_rank: 1,
            ..Self::string(name, description)
        }
    }

    pub fn is_array(&self) -> bool {
        self.value_rank >= 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    Empty,
    Boolean(bool),
    Byte(u8),
    Int32(i32),
    UInt32(u32),
    Double(f64),
    String(String),
    StringArray(Vec<String>),
    LocalizedText(LocalizedText),
    QualifiedName(QualifiedName),
    NodeId(NodeId),
    NodeClass(NodeClass),
    DateTime(DateTime<Utc>),
    Arguments(Vec<Argument>),
    UInt32Array(Vec<u32>),
}

impl Variant {
    /// The text of string-like variants.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Variant::String(s) => Some(s),
            Variant::LocalizedText(lt) => Some(&lt.text),
            _ => None,
        }
    }
}

impl From<&str> for Variant {
    fn from(s: &str) -> Self {
        Variant::String(s.to_string())
    }
}

impl From<String> for Variant {
    fn from(s: String) -> Self {
        Variant::String(s)
    }
}

impl From<Vec<String>> for Variant {
    fn from(v: Vec<String>) -> Self {
        Variant::StringArray(v)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Empty => Ok(()),
            Variant::Boolean(b) => write!(f, "{}", b),
            Variant::Byte(b) => write!(f, "{}", b),
            Variant::Int32(n) => write!(f, "{}", n),
            Variant::UInt32(n) => write!(f, "{}", n),
            Variant::Double(n) => write!(f, "{}", n),
            Variant::String(s) => f.write_str(s),
            Variant::StringArray(v) => write!(f, "[{}]", v.join(", ")),
            Variant::LocalizedText(lt) => f.write_str(&lt.text),
            Variant::QualifiedName(q) => write!(f, "{}:{}", q.namespace, q.name),
            Variant::NodeId(id) => write!(f, "{}", id),
            Variant::NodeClass(c) => write!(f, "{}", c),
            Variant::DateTime(d) => write!(f, "{}", d.to_rfc3339()),
            Variant::Arguments(args) => {
                let names: Vec<&str> = args.iter().map(|a| a.name.as_str()).collect();
                write!(f, "({})", names.join(", "))
            }
            Variant::UInt32Array(v) => write!(f, "{:?}", v),
        }
    }
}

/// Result codes returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Good,
    BadNodeIdUnknown,
    BadAttributeIdInvalid,
    BadNotWritable,
    BadTypeMismatch,
    BadArgumentsMissing,
    BadInvalidArgument,
    BadTooManyArguments,
    BadUserAccessDenied,
    BadCommunicationError,
    BadNoData,
    BadUnexpectedError,
}

impl StatusCode {
    pub fn is_good(self) -> bool {
        self == StatusCode::Good
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Zero of the protocol's DateTime: 1601-01-01T00:00:00Z.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1601, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// A value together with its status and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct DataValue {
    pub value: Variant,
    pub status: StatusCode,
    pub source_timestamp: Option<DateTime<Utc>>,
    pub server_timestamp: Option<DateTime<Utc>>,
}

impl DataValue {
    pub fn new(value: impl Into<Variant>) -> Self {
        Self {
            value: value.into(),
            status: StatusCode::Good,
            source_timestamp: None,
            server_timestamp: None,
        }
    }

    pub fn bad(status: StatusCode) -> Self {
        Self {
            value: Variant::Empty,
            status,
            source_timestamp: None,
            server_timestamp: None,
        }
    }

    /// Stamp the server time (now) and the given source time.
    pub fn stamped(mut self, source: DateTime<Utc>) -> Self {
        self.source_timestamp = Some(source);
        self.server_timestamp = Some(Utc::now());
        self
    }

    /// Stamp the server time only.
    pub fn served_now(mut self) -> Self {
        self.server_timestamp = Some(Utc::now());
        self
    }

    pub fn is_good(&self) -> bool {
        self.status.is_good()
    }
}

impl From<Variant> for DataValue {
    fn from(value: Variant) -> Self {
        DataValue::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_year_1601() {
        assert_eq!(epoch().to_rfc3339(), "1601-01-01T00:00:00+00:00");
    }

    #[test]
    fn bad_value_is_empty() {
        let dv = DataValue::bad(StatusCode::BadNoData);
        assert_eq!(dv.value, Variant::Empty);
        assert!(!dv.is_good());
    }

    #[test]
    fn argument_shapes() {
        let format = Argument::string_array("Format", 3, "");
        assert!(format.is_array());
        assert_eq!(format.array_dimensions, vec![3]);
        assert!(Argument::string_list("Title", "").array_dimensions.is_empty());
        assert!(!Argument::string("Namespace", "").is_array());
    }

    #[test]
    fn variant_display() {
        let v = Variant::StringArray(vec!["1".into(), "2".into()]);
        assert_eq!(v.to_string(), "[1, 2]");
        assert_eq!(Variant::from("x").as_text(), Some("x"));
    }
}
