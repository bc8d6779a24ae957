//! Tolerant decoding of raw activity JSON
//!
//! The backend is a WordPress/BuddyPress install whose REST responses are not
//! reliably typed: ids arrive as integers or strings, booleans as
//! `true`/`1`/`"1"`, content as a string or a `{ "rendered": ... }` object.
//! Everything lenient lives here, once, at the boundary; the rest of the
//! crate only sees canonical [`ActivityRecord`]s.

use serde_json::Value;
use thiserror::Error;

use crate::models::{ActivityKind, ActivityRecord};

/// Why a single raw record could not be decoded at all
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The `id` field was missing or not resolvable to an integer
    #[error("activity record has no usable id")]
    MissingId,
    /// The value was not a JSON object
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Integer from an integer, an integral float, or a numeric string
pub fn lenient_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Boolean from a native bool, a 0/1 integer, or a handful of string spellings
pub fn lenient_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim() {
            "0" | "false" => Some(false),
            "1" | "true" => Some(true),
            _ => None,
        },
        _ => None,
    }
}

/// Text from a plain string or a WordPress-style `{ "rendered": ... }` object
pub fn lenient_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("rendered").and_then(Value::as_str).map(String::from),
        _ => None,
    }
}

fn field<'a>(object: &'a Value, name: &str) -> Option<&'a Value> {
    object.get(name).filter(|v| !v.is_null())
}

/// Decode one raw activity object into its canonical form
///
/// Fails only when the mandatory `id` cannot be resolved to an integer by
/// either a direct or a string parse; every other field degrades to absent.
pub fn decode_activity(raw: &Value) -> Result<ActivityRecord, DecodeError> {
    if !raw.is_object() {
        return Err(DecodeError::NotAnObject(json_type(raw)));
    }

    let id = field(raw, "id")
        .and_then(lenient_i64)
        .ok_or(DecodeError::MissingId)?;

    let kind = field(raw, "type")
        .and_then(Value::as_str)
        .map_or(ActivityKind::Other(String::new()), ActivityKind::from_tag);

    let mut record = ActivityRecord::new(id, kind);
    record.user_id = field(raw, "user_id").and_then(lenient_i64);
    // Legacy endpoints say `item_id`, the v1 REST controller says `primary_item_id`
    record.item_id = field(raw, "item_id")
        .or_else(|| field(raw, "primary_item_id"))
        .and_then(lenient_i64);
    record.secondary_item_id = field(raw, "secondary_item_id").and_then(lenient_i64);
    record.content = field(raw, "content").and_then(lenient_text);
    record.favorited = field(raw, "favorited").and_then(lenient_bool);
    record.recorded_at = field(raw, "date_recorded")
        .or_else(|| field(raw, "date"))
        .and_then(Value::as_str)
        .map(String::from);

    Ok(record)
}

/// Decode every record of one page independently
///
/// A malformed record is dropped with a debug log; it never invalidates the
/// rest of its page.
pub fn decode_page(raw_page: &[Value]) -> Vec<ActivityRecord> {
    raw_page
        .iter()
        .filter_map(|raw| match decode_activity(raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("Dropping undecodable activity record: {e}");
                None
            }
        })
        .collect()
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_i64_variants() {
        assert_eq!(lenient_i64(&json!(42)), Some(42));
        assert_eq!(lenient_i64(&json!("42")), Some(42));
        assert_eq!(lenient_i64(&json!(" 42 ")), Some(42));
        assert_eq!(lenient_i64(&json!(42.0)), Some(42));
        assert_eq!(lenient_i64(&json!("forty-two")), None);
        assert_eq!(lenient_i64(&json!(null)), None);
        assert_eq!(lenient_i64(&json!([42])), None);
    }

    #[test]
    fn test_lenient_bool_variants() {
        assert_eq!(lenient_bool(&json!(true)), Some(true));
        assert_eq!(lenient_bool(&json!(0)), Some(false));
        assert_eq!(lenient_bool(&json!(1)), Some(true));
        assert_eq!(lenient_bool(&json!("1")), Some(true));
        assert_eq!(lenient_bool(&json!("0")), Some(false));
        assert_eq!(lenient_bool(&json!("false")), Some(false));
        assert_eq!(lenient_bool(&json!("yes")), None);
        assert_eq!(lenient_bool(&json!(2)), None);
    }

    #[test]
    fn test_decode_string_id() {
        let raw = json!({ "id": "42", "type": "activity_update" });
        let record = decode_activity(&raw).unwrap();
        assert_eq!(record.id, 42);
        assert_eq!(record.kind, ActivityKind::Update);
    }

    #[test]
    fn test_decode_missing_id_rejected() {
        assert_eq!(
            decode_activity(&json!({ "id": null, "type": "activity_update" })),
            Err(DecodeError::MissingId)
        );
        assert_eq!(
            decode_activity(&json!({ "type": "activity_update" })),
            Err(DecodeError::MissingId)
        );
        assert_eq!(decode_activity(&json!("nope")), Err(DecodeError::NotAnObject("string")));
    }

    #[test]
    fn test_decode_best_effort_fields() {
        let raw = json!({
            "id": 7,
            "type": "activity_comment",
            "user_id": "19",
            "item_id": {"bogus": true},
            "secondary_item_id": "5",
            "content": { "rendered": "<p>Agreed!</p>" },
            "favorited": "1",
            "date_recorded": "2024-01-02 10:00:00",
        });
        let record = decode_activity(&raw).unwrap();
        assert_eq!(record.user_id, Some(19));
        // Unusable field degrades to absent rather than failing the record
        assert_eq!(record.item_id, None);
        assert_eq!(record.secondary_item_id, Some(5));
        assert_eq!(record.content.as_deref(), Some("<p>Agreed!</p>"));
        assert_eq!(record.favorited, Some(true));
        assert_eq!(record.recorded_at.as_deref(), Some("2024-01-02 10:00:00"));
    }

    #[test]
    fn test_decode_primary_item_id_alias() {
        let raw = json!({ "id": 3, "type": "activity_comment", "primary_item_id": 1 });
        assert_eq!(decode_activity(&raw).unwrap().item_id, Some(1));
    }

    #[test]
    fn test_malformed_record_does_not_poison_page() {
        let page = vec![
            json!({ "id": 1, "type": "activity_update" }),
            json!({ "id": null }),
            json!({ "id": "3", "type": "activity_comment" }),
        ];
        let records = decode_page(&page);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[1].id, 3);
    }
}
