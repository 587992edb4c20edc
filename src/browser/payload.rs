//! Decoding of the opaque request/response payload columns.
//!
//! Payloads are usually JSON, sometimes JSON that was serialized twice (a
//! JSON string whose contents are JSON), and occasionally not JSON at all.

use serde_json::{Map, Value};

/// Decode a stored payload without ever failing.
///
/// - absent or blank → `{}`
/// - JSON → the parsed value
/// - JSON string containing JSON → parsed twice
/// - anything malformed → the raw text as a `Value::String`
pub fn decode_payload(raw: Option<&str>) -> Value {
    let Some(text) = raw.filter(|t| !t.trim().is_empty()) else {
        return Value::Object(Map::new());
    };

    match serde_json::from_str::<Value>(text) {
        Ok(Value::String(inner)) => match serde_json::from_str::<Value>(&inner) {
            Ok(value) => value,
            Err(_) => Value::String(text.to_string()),
        },
        Ok(value) => value,
        Err(_) => Value::String(text.to_string()),
    }
}

/// Pretty-print a decoded payload with two-space indentation. Undecodable
/// payloads come back as `Value::String` and are shown verbatim.
pub fn pretty_payload(value: &Value) -> String {
    match value {
        Value::String(raw) => raw.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Decode and pretty-print in one step.
pub fn pretty_raw(raw: Option<&str>) -> String {
    pretty_payload(&decode_payload(raw))
}

/// The texts a free-text search should look through for one payload: the
/// stored text itself and, when it decodes to structured JSON, its compact
/// serialization (which unwraps double encoding).
pub fn search_texts(raw: Option<&str>) -> Vec<String> {
    let Some(text) = raw else {
        return Vec::new();
    };

    let mut texts = vec![text.to_string()];
    let decoded = decode_payload(Some(text));
    if !decoded.is_string() {
        let compact = decoded.to_string();
        if compact != text {
            texts.push(compact);
        }
    }
    texts
}
