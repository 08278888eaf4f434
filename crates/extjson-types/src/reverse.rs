//! Reverse conversion: BSON → `ExtendedValue` → canonical extended JSON.
//!
//! The reverse direction is what fixture tooling uses to write fixture
//! files from native documents, and what makes round-trip testing
//! possible: `document_from_bson` followed by `document_to_json` produces
//! text the decoder turns back into the same document.

use crate::value::{DecodedDocument, ExtendedValue};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bson::spec::BinarySubtype;
use bson::Bson;
use serde_json::{json, Map, Value};

/// Convert a BSON value to an `ExtendedValue`.
pub fn from_bson(value: &Bson) -> ExtendedValue {
    match value {
        Bson::Null => ExtendedValue::Null,
        Bson::Boolean(b) => ExtendedValue::Bool(*b),
        Bson::Int32(i) => ExtendedValue::Int32(*i),
        Bson::Int64(i) => ExtendedValue::Int64(*i),
        Bson::Double(f) => ExtendedValue::Double(*f),
        Bson::Decimal128(d) => ExtendedValue::Decimal128(d.to_string()),
        Bson::String(s) => ExtendedValue::String(s.clone()),
        Bson::Symbol(s) => ExtendedValue::Symbol(s.clone()),
        Bson::ObjectId(oid) => ExtendedValue::ObjectId(*oid),
        Bson::DateTime(dt) => ExtendedValue::DateTime(dt.to_chrono()),
        Bson::Binary(bin) => {
            if bin.subtype == BinarySubtype::Uuid {
                if let Ok(uuid) = uuid::Uuid::from_slice(&bin.bytes) {
                    return ExtendedValue::Uuid(uuid);
                }
            }
            ExtendedValue::Binary {
                subtype: u8::from(bin.subtype),
                bytes: bin.bytes.clone(),
            }
        }
        Bson::Timestamp(ts) => ExtendedValue::Timestamp {
            time: ts.time,
            increment: ts.increment,
        },
        Bson::RegularExpression(regex) => ExtendedValue::Regex {
            pattern: regex.pattern.clone(),
            options: regex.options.clone(),
        },
        Bson::JavaScriptCode(code) => ExtendedValue::Code {
            code: code.clone(),
            scope: None,
        },
        Bson::JavaScriptCodeWithScope(cws) => ExtendedValue::Code {
            code: cws.code.clone(),
            scope: Some(document_from_bson(&cws.scope)),
        },
        Bson::MinKey => ExtendedValue::MinKey,
        Bson::MaxKey => ExtendedValue::MaxKey,
        Bson::Undefined => ExtendedValue::Undefined,
        Bson::Array(items) => ExtendedValue::Array(items.iter().map(from_bson).collect()),
        Bson::Document(doc) => ExtendedValue::Document(document_from_bson(doc)),
        // DbPointer is deprecated and its fields are private; keep a marker.
        Bson::DbPointer(_) => ExtendedValue::String("$dbPointer".to_string()),
    }
}

/// Convert a BSON document to a `DecodedDocument`, preserving field order.
pub fn document_from_bson(doc: &bson::Document) -> DecodedDocument {
    doc.iter()
        .map(|(name, value)| (name.clone(), from_bson(value)))
        .collect()
}

/// Render an `ExtendedValue` as canonical extended JSON.
pub fn to_json(value: &ExtendedValue) -> Value {
    match value {
        ExtendedValue::Null => Value::Null,
        ExtendedValue::Bool(b) => Value::Bool(*b),
        ExtendedValue::Int32(i) => json!({"$numberInt": i.to_string()}),
        ExtendedValue::Int64(i) => json!({"$numberLong": i.to_string()}),
        ExtendedValue::Double(f) => json!({"$numberDouble": render_double(*f)}),
        ExtendedValue::Decimal128(s) => json!({"$numberDecimal": s}),
        ExtendedValue::String(s) => Value::String(s.clone()),
        ExtendedValue::Symbol(s) => json!({"$symbol": s}),
        ExtendedValue::ObjectId(oid) => json!({"$oid": oid.to_hex()}),
        ExtendedValue::DateTime(dt) => {
            json!({"$date": {"$numberLong": dt.timestamp_millis().to_string()}})
        }
        ExtendedValue::Binary { subtype, bytes } => json!({
            "$binary": {"base64": BASE64.encode(bytes), "subType": format!("{subtype:02x}")}
        }),
        ExtendedValue::Uuid(uuid) => json!({"$uuid": uuid.to_string()}),
        ExtendedValue::Timestamp { time, increment } => {
            json!({"$timestamp": {"t": time, "i": increment}})
        }
        ExtendedValue::Regex { pattern, options } => {
            json!({"$regularExpression": {"pattern": pattern, "options": options}})
        }
        ExtendedValue::Code { code, scope } => match scope {
            Some(scope) => json!({"$code": code, "$scope": document_to_json(scope)}),
            None => json!({"$code": code}),
        },
        ExtendedValue::MinKey => json!({"$minKey": 1}),
        ExtendedValue::MaxKey => json!({"$maxKey": 1}),
        ExtendedValue::Undefined => json!({"$undefined": true}),
        ExtendedValue::Array(items) => Value::Array(items.iter().map(to_json).collect()),
        ExtendedValue::Document(doc) => document_to_json(doc),
    }
}

/// Render a decoded document as a canonical extended JSON object.
pub fn document_to_json(doc: &DecodedDocument) -> Value {
    let mut map = Map::new();
    for (name, value) in doc.iter() {
        map.insert(name.clone(), to_json(value));
    }
    Value::Object(map)
}

fn render_double(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f == f64::INFINITY {
        "Infinity".to_string()
    } else if f == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        f.to_string()
    }
}
