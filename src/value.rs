//! Helpers over the JSON value tree.
//!
//! The core algorithms operate on [`serde_json::Value`] with insertion-order
//! object keys (the `preserve_order` feature). SCIM semantics differ from
//! plain JSON equality in two ways that matter here: attribute names compare
//! case-insensitively, and numbers compare by decimal value, so `1` and
//! `1.0` are the same number.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde_json::{Map, Value};

/// Base64 engine for SCIM binary values: standard alphabet, and tolerant of
/// missing padding on decode as required for interoperability.
const BINARY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode a SCIM binary value.
///
/// Accepts input with or without padding and ignores embedded line breaks
/// and whitespace.
pub fn decode_base64(input: &str) -> Option<Vec<u8>> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    BINARY_ENGINE.decode(compact).ok()
}

/// Encode bytes as a SCIM binary value (standard alphabet, padded).
pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// JSON type name for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "decimal",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Case-insensitive attribute lookup in a JSON object.
pub fn get_ignore_case<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    obj.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v)
}

/// Case-insensitive mutable attribute lookup in a JSON object.
pub fn get_ignore_case_mut<'a>(
    obj: &'a mut Map<String, Value>,
    name: &str,
) -> Option<&'a mut Value> {
    let key = find_key(obj, name)?;
    obj.get_mut(&key)
}

/// The stored spelling of an attribute name, looked up case-insensitively.
pub fn find_key(obj: &Map<String, Value>, name: &str) -> Option<String> {
    obj.keys()
        .find(|k| k.eq_ignore_ascii_case(name))
        .cloned()
}

/// Remove an attribute by case-insensitive name, returning the old value.
pub fn remove_ignore_case(obj: &mut Map<String, Value>, name: &str) -> Option<Value> {
    let key = find_key(obj, name)?;
    obj.shift_remove(&key)
}

/// Structural equality with SCIM semantics.
///
/// Numbers compare by decimal value, object keys compare case-insensitively,
/// array order is significant. Everything else matches JSON equality.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, v)| {
                    get_ignore_case(y, k).is_some_and(|other| values_equal(v, other))
                })
        }
        _ => a == b,
    }
}

/// Multiset equality of two arrays: every element of `a` pairs off with a
/// distinct structurally equal element of `b`.
pub fn arrays_equal_unordered(a: &[Value], b: &[Value]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    for item in a {
        let Some(pos) = b
            .iter()
            .enumerate()
            .position(|(i, other)| !used[i] && values_equal(item, other))
        else {
            return false;
        };
        used[pos] = true;
    }
    true
}

/// True for the values SCIM treats as "nothing there": null and the empty
/// array.
pub fn is_null_or_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Recursively drop null and empty-array nodes.
///
/// Used when comparing documents for the diff/apply guarantee: a document
/// with `{"title": null, "emails": []}` describes the same resource as one
/// without those attributes.
pub fn normalize(value: &Value) -> Value {
    match value {
        Value::Object(obj) => {
            let mut out = Map::new();
            for (k, v) in obj {
                let v = normalize(v);
                if !is_null_or_empty(&v) {
                    out.insert(k.clone(), v);
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(normalize)
                .filter(|v| !matches!(v, Value::Null))
                .collect(),
        ),
        other => other.clone(),
    }
}
