//! The extended JSON value model.
//!
//! `ExtendedValue` is the closed set of value kinds a fixture document may
//! contain: JSON-native scalars, arrays, nested documents, and the extended
//! type tags MongoDB adds on top of plain JSON. `DecodedDocument` is one
//! top-level document, with field order preserved.

use chrono::{DateTime, Utc};

/// One decoded value inside a fixture document.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtendedValue {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    /// Raw decimal string; parsed by the BSON layer at conversion time.
    Decimal128(String),
    String(String),
    Symbol(String),
    ObjectId(bson::oid::ObjectId),
    DateTime(DateTime<Utc>),
    Binary {
        subtype: u8,
        bytes: Vec<u8>,
    },
    Uuid(uuid::Uuid),
    Timestamp {
        time: u32,
        increment: u32,
    },
    Regex {
        pattern: String,
        options: String,
    },
    Code {
        code: String,
        scope: Option<DecodedDocument>,
    },
    MinKey,
    MaxKey,
    Undefined,
    Array(Vec<ExtendedValue>),
    Document(DecodedDocument),
}

/// An ordered sequence of (field name, value) pairs representing one document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedDocument {
    fields: Vec<(String, ExtendedValue)>,
}

impl DecodedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Field names are not deduplicated; BSON permits
    /// repeated keys and the fixture author gets what they wrote.
    pub fn push(&mut self, name: impl Into<String>, value: ExtendedValue) {
        self.fields.push((name.into(), value));
    }

    /// First value stored under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&ExtendedValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, ExtendedValue)> {
        self.fields.iter()
    }
}

impl FromIterator<(String, ExtendedValue)> for DecodedDocument {
    fn from_iter<I: IntoIterator<Item = (String, ExtendedValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for DecodedDocument {
    type Item = (String, ExtendedValue);
    type IntoIter = std::vec::IntoIter<(String, ExtendedValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
