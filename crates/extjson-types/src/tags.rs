//! Extended-type tag resolution: JSON values → `ExtendedValue`.
//!
//! Tag handling is table-driven: `TAG_TABLE` maps a tag key like `$oid` to
//! its decode function, so supporting a new extended type is one table
//! entry. An object whose single `$`-prefixed key is not in the table is
//! not an error; it passes through as a plain nested document.

use crate::error::TypeExtensionError;
use crate::value::{DecodedDocument, ExtendedValue};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{Map, Value};

type TagDecoder = fn(&Value) -> Result<ExtendedValue, TypeExtensionError>;

/// Recognized extended-type tags, canonical extended JSON v2 names.
const TAG_TABLE: &[(&str, TagDecoder)] = &[
    ("$oid", decode_object_id),
    ("$date", decode_date),
    ("$numberInt", decode_number_int),
    ("$numberLong", decode_number_long),
    ("$numberDouble", decode_number_double),
    ("$numberDecimal", decode_number_decimal),
    ("$binary", decode_binary),
    ("$uuid", decode_uuid),
    ("$timestamp", decode_timestamp),
    ("$regularExpression", decode_regex),
    ("$symbol", decode_symbol),
    ("$minKey", decode_min_key),
    ("$maxKey", decode_max_key),
    ("$undefined", decode_undefined),
];

fn tag_decoder(key: &str) -> Option<TagDecoder> {
    TAG_TABLE
        .iter()
        .find(|(tag, _)| *tag == key)
        .map(|(_, decoder)| *decoder)
}

/// Convert a parsed JSON value into an `ExtendedValue`, resolving tags.
pub fn from_json(value: &Value) -> Result<ExtendedValue, TypeExtensionError> {
    match value {
        Value::Null => Ok(ExtendedValue::Null),
        Value::Bool(b) => Ok(ExtendedValue::Bool(*b)),
        Value::Number(n) => Ok(number_from_json(n)),
        Value::String(s) => Ok(ExtendedValue::String(s.clone())),
        Value::Array(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(from_json(item)?);
            }
            Ok(ExtendedValue::Array(values))
        }
        Value::Object(map) => object_from_json(map),
    }
}

/// Convert a top-level JSON object into a `DecodedDocument`.
pub fn document_from_json(map: &Map<String, Value>) -> Result<DecodedDocument, TypeExtensionError> {
    let mut doc = DecodedDocument::new();
    for (name, value) in map {
        doc.push(name.clone(), from_json(value)?);
    }
    Ok(doc)
}

fn number_from_json(n: &serde_json::Number) -> ExtendedValue {
    if let Some(i) = n.as_i64() {
        if let Ok(i32_value) = i32::try_from(i) {
            ExtendedValue::Int32(i32_value)
        } else {
            ExtendedValue::Int64(i)
        }
    } else if let Some(f) = n.as_f64() {
        ExtendedValue::Double(f)
    } else {
        // u64 beyond i64::MAX; BSON has no unsigned integer type.
        ExtendedValue::Double(n.as_u64().map(|u| u as f64).unwrap_or(f64::NAN))
    }
}

fn object_from_json(map: &Map<String, Value>) -> Result<ExtendedValue, TypeExtensionError> {
    if map.len() == 1 {
        let (key, payload) = map.iter().next().unwrap();
        if let Some(decoder) = tag_decoder(key) {
            return decoder(payload);
        }
    }

    // $code stands alone or pairs with $scope.
    if let Some(code) = map.get("$code") {
        let scope = map.get("$scope");
        let recognized = map.len() == 1 || (map.len() == 2 && scope.is_some());
        if recognized {
            return decode_code(code, scope);
        }
    }

    Ok(ExtendedValue::Document(document_from_json(map)?))
}

fn decode_object_id(payload: &Value) -> Result<ExtendedValue, TypeExtensionError> {
    let s = payload
        .as_str()
        .ok_or_else(|| TypeExtensionError::InvalidObjectId {
            value: payload.to_string(),
        })?;
    let oid =
        bson::oid::ObjectId::parse_str(s).map_err(|_| TypeExtensionError::InvalidObjectId {
            value: s.to_string(),
        })?;
    Ok(ExtendedValue::ObjectId(oid))
}

fn decode_date(payload: &Value) -> Result<ExtendedValue, TypeExtensionError> {
    let invalid = || TypeExtensionError::InvalidDate {
        value: payload.to_string(),
    };
    match payload {
        // Relaxed form: RFC 3339 string.
        Value::String(s) => {
            let dt = chrono::DateTime::parse_from_rfc3339(s).map_err(|_| invalid())?;
            Ok(ExtendedValue::DateTime(dt.with_timezone(&chrono::Utc)))
        }
        // Canonical form: {"$numberLong": "<millis>"}.
        Value::Object(map) if map.len() == 1 => {
            let millis = map
                .get("$numberLong")
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or_else(invalid)?;
            let dt = chrono::DateTime::from_timestamp_millis(millis).ok_or_else(invalid)?;
            Ok(ExtendedValue::DateTime(dt))
        }
        // Bare millisecond count.
        Value::Number(n) => {
            let millis = n.as_i64().ok_or_else(invalid)?;
            let dt = chrono::DateTime::from_timestamp_millis(millis).ok_or_else(invalid)?;
            Ok(ExtendedValue::DateTime(dt))
        }
        _ => Err(invalid()),
    }
}

fn decode_number_int(payload: &Value) -> Result<ExtendedValue, TypeExtensionError> {
    let invalid = || TypeExtensionError::InvalidNumber {
        tag: "$numberInt",
        value: payload.to_string(),
    };
    match payload {
        Value::String(s) => s.parse::<i32>().map(ExtendedValue::Int32).map_err(|_| invalid()),
        Value::Number(n) => n
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .map(ExtendedValue::Int32)
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

fn decode_number_long(payload: &Value) -> Result<ExtendedValue, TypeExtensionError> {
    let invalid = || TypeExtensionError::InvalidNumber {
        tag: "$numberLong",
        value: payload.to_string(),
    };
    match payload {
        Value::String(s) => s.parse::<i64>().map(ExtendedValue::Int64).map_err(|_| invalid()),
        Value::Number(n) => n.as_i64().map(ExtendedValue::Int64).ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

fn decode_number_double(payload: &Value) -> Result<ExtendedValue, TypeExtensionError> {
    let invalid = || TypeExtensionError::InvalidNumber {
        tag: "$numberDouble",
        value: payload.to_string(),
    };
    match payload {
        // f64::from_str accepts "NaN", "Infinity" and "-Infinity".
        Value::String(s) => s.parse::<f64>().map(ExtendedValue::Double).map_err(|_| invalid()),
        Value::Number(n) => n.as_f64().map(ExtendedValue::Double).ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

fn decode_number_decimal(payload: &Value) -> Result<ExtendedValue, TypeExtensionError> {
    match payload {
        Value::String(s) => Ok(ExtendedValue::Decimal128(s.clone())),
        _ => Err(TypeExtensionError::InvalidPayload {
            tag: "$numberDecimal",
            expected: "a decimal string",
        }),
    }
}

fn decode_binary(payload: &Value) -> Result<ExtendedValue, TypeExtensionError> {
    let map = payload
        .as_object()
        .ok_or(TypeExtensionError::InvalidPayload {
            tag: "$binary",
            expected: "an object with base64 and subType fields",
        })?;
    let data = map
        .get("base64")
        .and_then(|v| v.as_str())
        .ok_or_else(|| TypeExtensionError::InvalidBinary {
            reason: "missing base64 field".to_string(),
        })?;
    let bytes = BASE64
        .decode(data)
        .map_err(|e| TypeExtensionError::InvalidBinary {
            reason: format!("bad base64 data: {e}"),
        })?;
    let subtype = match map.get("subType") {
        Some(Value::String(s)) => {
            u8::from_str_radix(s, 16).map_err(|_| TypeExtensionError::InvalidBinary {
                reason: format!("bad subType '{s}'"),
            })?
        }
        None => 0,
        Some(other) => {
            return Err(TypeExtensionError::InvalidBinary {
                reason: format!("bad subType '{other}'"),
            })
        }
    };
    Ok(ExtendedValue::Binary { subtype, bytes })
}

fn decode_uuid(payload: &Value) -> Result<ExtendedValue, TypeExtensionError> {
    let s = payload
        .as_str()
        .ok_or_else(|| TypeExtensionError::InvalidUuid {
            value: payload.to_string(),
        })?;
    let uuid = uuid::Uuid::parse_str(s).map_err(|_| TypeExtensionError::InvalidUuid {
        value: s.to_string(),
    })?;
    Ok(ExtendedValue::Uuid(uuid))
}

fn decode_timestamp(payload: &Value) -> Result<ExtendedValue, TypeExtensionError> {
    let invalid = || TypeExtensionError::InvalidTimestamp {
        value: payload.to_string(),
    };
    let map = payload.as_object().ok_or_else(invalid)?;
    let field = |name: &str| {
        map.get(name)
            .and_then(|v| v.as_u64())
            .and_then(|u| u32::try_from(u).ok())
    };
    let time = field("t").ok_or_else(invalid)?;
    let increment = field("i").ok_or_else(invalid)?;
    Ok(ExtendedValue::Timestamp { time, increment })
}

fn decode_regex(payload: &Value) -> Result<ExtendedValue, TypeExtensionError> {
    let map = payload
        .as_object()
        .ok_or(TypeExtensionError::InvalidPayload {
            tag: "$regularExpression",
            expected: "an object with pattern and options fields",
        })?;
    let pattern = map
        .get("pattern")
        .and_then(|v| v.as_str())
        .ok_or(TypeExtensionError::InvalidPayload {
            tag: "$regularExpression",
            expected: "a string pattern field",
        })?;
    let options = match map.get("options") {
        Some(Value::String(s)) => s.clone(),
        None => String::new(),
        Some(_) => {
            return Err(TypeExtensionError::InvalidPayload {
                tag: "$regularExpression",
                expected: "a string options field",
            })
        }
    };
    Ok(ExtendedValue::Regex {
        pattern: pattern.to_string(),
        options,
    })
}

fn decode_symbol(payload: &Value) -> Result<ExtendedValue, TypeExtensionError> {
    match payload {
        Value::String(s) => Ok(ExtendedValue::Symbol(s.clone())),
        _ => Err(TypeExtensionError::InvalidPayload {
            tag: "$symbol",
            expected: "a string",
        }),
    }
}

fn decode_code(
    code: &Value,
    scope: Option<&Value>,
) -> Result<ExtendedValue, TypeExtensionError> {
    let code = code
        .as_str()
        .ok_or(TypeExtensionError::InvalidPayload {
            tag: "$code",
            expected: "a string",
        })?
        .to_string();
    let scope = match scope {
        Some(Value::Object(map)) => Some(document_from_json(map)?),
        Some(_) => {
            return Err(TypeExtensionError::InvalidPayload {
                tag: "$scope",
                expected: "an object",
            })
        }
        None => None,
    };
    Ok(ExtendedValue::Code { code, scope })
}

fn decode_min_key(payload: &Value) -> Result<ExtendedValue, TypeExtensionError> {
    match payload.as_u64() {
        Some(1) => Ok(ExtendedValue::MinKey),
        _ => Err(TypeExtensionError::InvalidPayload {
            tag: "$minKey",
            expected: "the number 1",
        }),
    }
}

fn decode_max_key(payload: &Value) -> Result<ExtendedValue, TypeExtensionError> {
    match payload.as_u64() {
        Some(1) => Ok(ExtendedValue::MaxKey),
        _ => Err(TypeExtensionError::InvalidPayload {
            tag: "$maxKey",
            expected: "the number 1",
        }),
    }
}

fn decode_undefined(payload: &Value) -> Result<ExtendedValue, TypeExtensionError> {
    match payload {
        Value::Bool(true) => Ok(ExtendedValue::Undefined),
        _ => Err(TypeExtensionError::InvalidPayload {
            tag: "$undefined",
            expected: "the value true",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_id() {
        let v = json!({"$oid": "507f1f77bcf86cd799439011"});
        let decoded = from_json(&v).unwrap();
        assert!(matches!(decoded, ExtendedValue::ObjectId(oid)
            if oid.to_hex() == "507f1f77bcf86cd799439011"));
    }

    #[test]
    fn test_object_id_wrong_length() {
        let v = json!({"$oid": "507f1f77"});
        let err = from_json(&v).unwrap_err();
        assert!(matches!(err, TypeExtensionError::InvalidObjectId { value } if value == "507f1f77"));
    }

    #[test]
    fn test_date_rfc3339() {
        let v = json!({"$date": "2024-06-15T10:30:00Z"});
        let decoded = from_json(&v).unwrap();
        if let ExtendedValue::DateTime(dt) = decoded {
            assert_eq!(dt.to_rfc3339(), "2024-06-15T10:30:00+00:00");
        } else {
            panic!("Expected DateTime");
        }
    }

    #[test]
    fn test_date_number_long() {
        let v = json!({"$date": {"$numberLong": "1718447400000"}});
        let decoded = from_json(&v).unwrap();
        if let ExtendedValue::DateTime(dt) = decoded {
            assert_eq!(dt.timestamp_millis(), 1718447400000);
        } else {
            panic!("Expected DateTime");
        }
    }

    #[test]
    fn test_date_garbage() {
        let v = json!({"$date": "yesterday"});
        assert!(matches!(
            from_json(&v),
            Err(TypeExtensionError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_number_tags() {
        assert_eq!(
            from_json(&json!({"$numberInt": "42"})).unwrap(),
            ExtendedValue::Int32(42)
        );
        assert_eq!(
            from_json(&json!({"$numberLong": "9876543210"})).unwrap(),
            ExtendedValue::Int64(9876543210)
        );
        assert_eq!(
            from_json(&json!({"$numberDouble": "1.5"})).unwrap(),
            ExtendedValue::Double(1.5)
        );
    }

    #[test]
    fn test_number_double_non_finite() {
        let decoded = from_json(&json!({"$numberDouble": "NaN"})).unwrap();
        assert!(matches!(decoded, ExtendedValue::Double(f) if f.is_nan()));
        let decoded = from_json(&json!({"$numberDouble": "-Infinity"})).unwrap();
        assert!(matches!(decoded, ExtendedValue::Double(f) if f == f64::NEG_INFINITY));
    }

    #[test]
    fn test_number_int_overflow() {
        let v = json!({"$numberInt": "9876543210"});
        assert!(matches!(
            from_json(&v),
            Err(TypeExtensionError::InvalidNumber { tag: "$numberInt", .. })
        ));
    }

    #[test]
    fn test_binary() {
        let v = json!({"$binary": {"base64": "AQID", "subType": "00"}});
        let decoded = from_json(&v).unwrap();
        assert_eq!(
            decoded,
            ExtendedValue::Binary {
                subtype: 0,
                bytes: vec![1, 2, 3]
            }
        );
    }

    #[test]
    fn test_binary_bad_base64() {
        let v = json!({"$binary": {"base64": "!!!", "subType": "00"}});
        assert!(matches!(
            from_json(&v),
            Err(TypeExtensionError::InvalidBinary { .. })
        ));
    }

    #[test]
    fn test_uuid() {
        let v = json!({"$uuid": "550e8400-e29b-41d4-a716-446655440000"});
        let decoded = from_json(&v).unwrap();
        assert!(matches!(decoded, ExtendedValue::Uuid(u)
            if u.to_string() == "550e8400-e29b-41d4-a716-446655440000"));
    }

    #[test]
    fn test_timestamp() {
        let v = json!({"$timestamp": {"t": 1718447400, "i": 7}});
        assert_eq!(
            from_json(&v).unwrap(),
            ExtendedValue::Timestamp {
                time: 1718447400,
                increment: 7
            }
        );
    }

    #[test]
    fn test_regex() {
        let v = json!({"$regularExpression": {"pattern": "^a.*z$", "options": "i"}});
        assert_eq!(
            from_json(&v).unwrap(),
            ExtendedValue::Regex {
                pattern: "^a.*z$".to_string(),
                options: "i".to_string()
            }
        );
    }

    #[test]
    fn test_code_with_scope() {
        let v = json!({"$code": "function() {}", "$scope": {"n": 1}});
        if let ExtendedValue::Code { code, scope } = from_json(&v).unwrap() {
            assert_eq!(code, "function() {}");
            let scope = scope.unwrap();
            assert_eq!(scope.get("n"), Some(&ExtendedValue::Int32(1)));
        } else {
            panic!("Expected Code");
        }
    }

    #[test]
    fn test_unknown_dollar_key_passes_through() {
        let v = json!({"$lookup": "not a tag"});
        let decoded = from_json(&v).unwrap();
        if let ExtendedValue::Document(doc) = decoded {
            assert_eq!(
                doc.get("$lookup"),
                Some(&ExtendedValue::String("not a tag".to_string()))
            );
        } else {
            panic!("Expected Document");
        }
    }

    #[test]
    fn test_tagged_object_with_extra_keys_is_plain_document() {
        // A real tag key next to an ordinary key is not a tag use.
        let v = json!({"$oid": "507f1f77bcf86cd799439011", "note": "plain"});
        assert!(matches!(from_json(&v).unwrap(), ExtendedValue::Document(_)));
    }

    #[test]
    fn test_plain_scalars_and_arrays() {
        assert_eq!(from_json(&json!(null)).unwrap(), ExtendedValue::Null);
        assert_eq!(from_json(&json!(true)).unwrap(), ExtendedValue::Bool(true));
        assert_eq!(from_json(&json!(7)).unwrap(), ExtendedValue::Int32(7));
        assert_eq!(
            from_json(&json!(5_000_000_000_i64)).unwrap(),
            ExtendedValue::Int64(5_000_000_000)
        );
        assert_eq!(from_json(&json!(2.5)).unwrap(), ExtendedValue::Double(2.5));
        assert_eq!(
            from_json(&json!([1, "two"])).unwrap(),
            ExtendedValue::Array(vec![
                ExtendedValue::Int32(1),
                ExtendedValue::String("two".to_string())
            ])
        );
    }

    #[test]
    fn test_document_field_order() {
        let v = json!({"z": 1, "a": 2, "m": 3});
        if let ExtendedValue::Document(doc) = from_json(&v).unwrap() {
            let names: Vec<&str> = doc.iter().map(|(n, _)| n.as_str()).collect();
            assert_eq!(names, vec!["z", "a", "m"]);
        } else {
            panic!("Expected Document");
        }
    }
}
