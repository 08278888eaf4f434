//! Forward conversion: `ExtendedValue` → BSON.
//!
//! Turns decoded fixture values into the concrete BSON runtime types the
//! MongoDB driver inserts.

use crate::error::ConversionError;
use crate::value::{DecodedDocument, ExtendedValue};
use bson::spec::BinarySubtype;
use bson::Bson;
use std::str::FromStr;

/// Convert a single value to BSON.
pub fn to_bson(value: &ExtendedValue) -> Result<Bson, ConversionError> {
    match value {
        ExtendedValue::Null => Ok(Bson::Null),
        ExtendedValue::Bool(b) => Ok(Bson::Boolean(*b)),
        ExtendedValue::Int32(i) => Ok(Bson::Int32(*i)),
        ExtendedValue::Int64(i) => Ok(Bson::Int64(*i)),
        ExtendedValue::Double(f) => Ok(Bson::Double(*f)),
        ExtendedValue::Decimal128(s) => {
            let decimal = bson::Decimal128::from_str(s).map_err(|_| {
                ConversionError::InvalidDecimal { value: s.clone() }
            })?;
            Ok(Bson::Decimal128(decimal))
        }
        ExtendedValue::String(s) => Ok(Bson::String(s.clone())),
        ExtendedValue::Symbol(s) => Ok(Bson::Symbol(s.clone())),
        ExtendedValue::ObjectId(oid) => Ok(Bson::ObjectId(*oid)),
        ExtendedValue::DateTime(dt) => Ok(Bson::DateTime(bson::DateTime::from_chrono(*dt))),
        ExtendedValue::Binary { subtype, bytes } => Ok(Bson::Binary(bson::Binary {
            subtype: BinarySubtype::from(*subtype),
            bytes: bytes.clone(),
        })),
        ExtendedValue::Uuid(uuid) => Ok(Bson::Binary(bson::Binary {
            subtype: BinarySubtype::Uuid,
            bytes: uuid.as_bytes().to_vec(),
        })),
        ExtendedValue::Timestamp { time, increment } => Ok(Bson::Timestamp(bson::Timestamp {
            time: *time,
            increment: *increment,
        })),
        ExtendedValue::Regex { pattern, options } => Ok(Bson::RegularExpression(bson::Regex {
            pattern: pattern.clone(),
            options: options.clone(),
        })),
        ExtendedValue::Code { code, scope } => match scope {
            Some(scope) => Ok(Bson::JavaScriptCodeWithScope(
                bson::JavaScriptCodeWithScope {
                    code: code.clone(),
                    scope: to_document(scope)?,
                },
            )),
            None => Ok(Bson::JavaScriptCode(code.clone())),
        },
        ExtendedValue::MinKey => Ok(Bson::MinKey),
        ExtendedValue::MaxKey => Ok(Bson::MaxKey),
        ExtendedValue::Undefined => Ok(Bson::Undefined),
        ExtendedValue::Array(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(to_bson(item)?);
            }
            Ok(Bson::Array(values))
        }
        ExtendedValue::Document(doc) => Ok(Bson::Document(to_document(doc)?)),
    }
}

/// Convert a decoded document to a BSON document, preserving field order.
pub fn to_document(doc: &DecodedDocument) -> Result<bson::Document, ConversionError> {
    let mut out = bson::Document::new();
    for (name, value) in doc.iter() {
        out.insert(name.clone(), to_bson(value)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_scalars() {
        assert_eq!(to_bson(&ExtendedValue::Null).unwrap(), Bson::Null);
        assert_eq!(
            to_bson(&ExtendedValue::Bool(true)).unwrap(),
            Bson::Boolean(true)
        );
        assert_eq!(to_bson(&ExtendedValue::Int32(7)).unwrap(), Bson::Int32(7));
        assert_eq!(
            to_bson(&ExtendedValue::Int64(1 << 40)).unwrap(),
            Bson::Int64(1 << 40)
        );
        assert_eq!(
            to_bson(&ExtendedValue::Double(2.5)).unwrap(),
            Bson::Double(2.5)
        );
    }

    #[test]
    fn test_datetime_millis() {
        let dt = chrono::Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap();
        let bson_value = to_bson(&ExtendedValue::DateTime(dt)).unwrap();
        if let Bson::DateTime(b) = bson_value {
            assert_eq!(b.timestamp_millis(), dt.timestamp_millis());
        } else {
            panic!("Expected DateTime");
        }
    }

    #[test]
    fn test_decimal_parse() {
        let bson_value = to_bson(&ExtendedValue::Decimal128("123.456".to_string())).unwrap();
        if let Bson::Decimal128(d) = bson_value {
            assert_eq!(d.to_string(), "123.456");
        } else {
            panic!("Expected Decimal128");
        }
    }

    #[test]
    fn test_decimal_rejects_garbage() {
        let err = to_bson(&ExtendedValue::Decimal128("not-a-number".to_string())).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidDecimal { value } if value == "not-a-number"));
    }

    #[test]
    fn test_uuid_becomes_binary_subtype_4() {
        let uuid = uuid::Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let bson_value = to_bson(&ExtendedValue::Uuid(uuid)).unwrap();
        if let Bson::Binary(bin) = bson_value {
            assert_eq!(bin.subtype, BinarySubtype::Uuid);
            assert_eq!(bin.bytes, uuid.as_bytes().to_vec());
        } else {
            panic!("Expected Binary");
        }
    }

    #[test]
    fn test_document_order() {
        let mut doc = DecodedDocument::new();
        doc.push("z", ExtendedValue::Int32(1));
        doc.push("a", ExtendedValue::Int32(2));
        let bson_doc = to_document(&doc).unwrap();
        let keys: Vec<&str> = bson_doc.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_code_with_scope() {
        let mut scope = DecodedDocument::new();
        scope.push("n", ExtendedValue::Int32(1));
        let value = ExtendedValue::Code {
            code: "function() {}".to_string(),
            scope: Some(scope),
        };
        if let Bson::JavaScriptCodeWithScope(cws) = to_bson(&value).unwrap() {
            assert_eq!(cws.code, "function() {}");
            assert_eq!(cws.scope.get_i32("n").unwrap(), 1);
        } else {
            panic!("Expected JavaScriptCodeWithScope");
        }
    }
}
