//! Backend payload to [`CategoryRecord`] conversion.
//!
//! The category endpoint has shipped several response shapes over time. All
//! of the tolerance for them lives here so the engine only ever sees clean
//! records.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::catalog::{CategoryId, CategoryRecord};
use crate::util::strip_control_chars;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unrecognized response shape: expected a category array, found {0}")]
    UnrecognizedShape(&'static str),
}

/// Keys under `data` that may hold the record array.
const NESTED_ARRAY_KEYS: &[&str] = &["categories", "items", "docs"];

const ID_KEYS: &[&str] = &["id", "_id"];
const TITLE_KEYS: &[&str] = &["title", "name"];
const PARENT_KEYS: &[&str] = &["parentRef", "parent", "parentCategory", "parent_category"];
const THUMBNAIL_KEYS: &[&str] = &["thumbnailRef", "thumbnail", "image"];
const CREATED_AT_KEYS: &[&str] = &["createdAt", "created_at"];

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Locate the record array inside a response envelope.
///
/// Accepted shapes, checked in order:
/// - `[...]`
/// - `{"data": [...]}`
/// - `{"data": {"categories" | "items" | "docs": [...]}}`
/// - `{"categories": [...]}`
pub fn parse_envelope(body: &Value) -> Result<&[Value], EnvelopeError> {
    let found = match body {
        Value::Array(items) => Some(items),
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(items)) => Some(items),
            Some(Value::Object(inner)) => NESTED_ARRAY_KEYS
                .iter()
                .find_map(|key| inner.get(*key).and_then(Value::as_array)),
            _ => map.get("categories").and_then(Value::as_array),
        },
        _ => None,
    };

    found
        .map(Vec::as_slice)
        .ok_or(EnvelopeError::UnrecognizedShape(kind(body)))
}

/// Parse a response body and normalize every usable record.
///
/// Entries without an id or a title are skipped with a warning; everything
/// else is kept in payload order.
pub fn parse_records(body: &str) -> Result<Vec<CategoryRecord>, EnvelopeError> {
    let value: Value = serde_json::from_str(body)?;
    let items = parse_envelope(&value)?;

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match normalize_record(item) {
            Some(record) => records.push(record),
            None => {
                tracing::warn!(index, kind = kind(item), "Skipping category without id or title");
            }
        }
    }

    if records.len() < items.len() {
        tracing::debug!(
            kept = records.len(),
            received = items.len(),
            "Normalized category payload with skipped entries"
        );
    }

    Ok(records)
}

/// Convert one payload entry, or `None` when it lacks an id or title.
pub fn normalize_record(item: &Value) -> Option<CategoryRecord> {
    let obj = item.as_object()?;

    let id = first(obj, ID_KEYS).and_then(id_text)?;
    let title = first(obj, TITLE_KEYS).and_then(text)?;

    let mut record = CategoryRecord::new(CategoryId::new(id), title);
    record.parent_ref = first(obj, PARENT_KEYS).and_then(parent_title);
    record.status = first(obj, &["status"]).map(status_text).unwrap_or_default();
    record.description = first(obj, &["description"]).and_then(text);
    record.thumbnail_ref = first(obj, THUMBNAIL_KEYS).and_then(thumbnail);
    record.created_at = first(obj, CREATED_AT_KEYS).and_then(timestamp);
    record.created_by_name = first(obj, &["createdByName"])
        .and_then(text)
        .or_else(|| first(obj, &["createdBy"]).and_then(person_name));

    Some(record)
}

/// First present, non-null value among `keys`.
fn first<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

/// Trimmed, non-empty string with control characters and escape sequences
/// removed. Every string field of a record passes through here.
fn text(value: &Value) -> Option<String> {
    let raw = value.as_str()?;
    let cleaned = strip_control_chars(raw);
    let trimmed = cleaned.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        // Mongo extended JSON
        Value::Object(obj) => obj.get("$oid").and_then(text),
        _ => text(value),
    }
}

fn parent_title(value: &Value) -> Option<String> {
    match value {
        Value::Object(obj) => first(obj, TITLE_KEYS).and_then(text),
        _ => text(value),
    }
}

fn status_text(value: &Value) -> String {
    match value {
        Value::Bool(true) => "active".to_owned(),
        Value::Bool(false) => "inactive".to_owned(),
        Value::Number(n) => n.to_string(),
        _ => text(value).unwrap_or_default(),
    }
}

fn thumbnail(value: &Value) -> Option<String> {
    match value {
        Value::Object(obj) => first(obj, &["secure_url", "url", "publicId", "public_id"]).and_then(text),
        _ => text(value),
    }
}

/// Strings are kept verbatim; epoch milliseconds become RFC 3339.
fn timestamp(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(chrono::DateTime::from_timestamp_millis)
            .map(|dt| dt.to_rfc3339()),
        _ => text(value),
    }
}

fn person_name(value: &Value) -> Option<String> {
    match value {
        Value::Object(obj) => first(obj, &["fullName", "name"]).and_then(text),
        _ => text(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shapes() {
        let one = json!({"id": "1", "title": "Shoes"});
        let shapes = [
            json!([one.clone()]),
            json!({"data": [one.clone()]}),
            json!({"data": {"categories": [one.clone()]}}),
            json!({"data": {"items": [one.clone()]}}),
            json!({"data": {"docs": [one.clone()]}}),
            json!({"categories": [one.clone()]}),
        ];
        for shape in &shapes {
            let items = parse_envelope(shape).unwrap();
            assert_eq!(items.len(), 1, "shape {shape}");
        }
    }

    #[test]
    fn test_envelope_rejects_unknown_shapes() {
        assert!(matches!(
            parse_envelope(&json!({"data": {"rows": []}})),
            Err(EnvelopeError::UnrecognizedShape("object"))
        ));
        assert!(matches!(
            parse_envelope(&json!("categories")),
            Err(EnvelopeError::UnrecognizedShape("string"))
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse_records("{not json"), Err(EnvelopeError::Json(_))));
    }

    #[test]
    fn test_field_aliases() {
        let record = normalize_record(&json!({
            "_id": 42,
            "name": "  Sneakers ",
            "parentCategory": {"title": "Shoes"},
            "status": true,
            "image": {"secure_url": "https://img.example/s.png"},
            "created_at": "2024-03-01T10:00:00Z",
            "createdBy": {"fullName": "Lan Nguyen"},
            "description": "Everyday trainers"
        }))
        .unwrap();

        assert_eq!(record.id.as_str(), "42");
        assert_eq!(record.title, "Sneakers");
        assert_eq!(record.parent_ref.as_deref(), Some("Shoes"));
        assert_eq!(record.status, "active");
        assert_eq!(record.thumbnail_ref.as_deref(), Some("https://img.example/s.png"));
        assert_eq!(record.created_at.as_deref(), Some("2024-03-01T10:00:00Z"));
        assert_eq!(record.created_by_name.as_deref(), Some("Lan Nguyen"));
        assert_eq!(record.description.as_deref(), Some("Everyday trainers"));
    }

    #[test]
    fn test_canonical_keys_take_precedence() {
        let record = normalize_record(&json!({
            "id": "a",
            "_id": "b",
            "title": "Hats",
            "name": "Caps",
            "parentRef": "Accessories",
            "parent": "Clothing",
            "createdByName": "Minh",
            "createdBy": "someone else"
        }))
        .unwrap();

        assert_eq!(record.id.as_str(), "a");
        assert_eq!(record.title, "Hats");
        assert_eq!(record.parent_ref.as_deref(), Some("Accessories"));
        assert_eq!(record.created_by_name.as_deref(), Some("Minh"));
    }

    #[test]
    fn test_null_falls_through_to_alias() {
        let record = normalize_record(&json!({"id": null, "_id": "7", "title": "Bags"})).unwrap();
        assert_eq!(record.id.as_str(), "7");
    }

    #[test]
    fn test_blank_parent_is_root() {
        let record = normalize_record(&json!({"id": "1", "title": "Shoes", "parent": "   "})).unwrap();
        assert_eq!(record.parent_ref, None);
    }

    #[test]
    fn test_status_variants() {
        let inactive = normalize_record(&json!({"id": "1", "title": "A", "status": false})).unwrap();
        assert_eq!(inactive.status, "inactive");
        let raw = normalize_record(&json!({"id": "1", "title": "A", "status": "Hoạt động"})).unwrap();
        assert_eq!(raw.status, "Hoạt động");
        assert!(raw.is_active());
        let missing = normalize_record(&json!({"id": "1", "title": "A"})).unwrap();
        assert_eq!(missing.status, "");
    }

    #[test]
    fn test_epoch_millis_created_at() {
        let record =
            normalize_record(&json!({"id": "1", "title": "A", "createdAt": 1_700_000_000_000_i64})).unwrap();
        assert_eq!(record.created_at.as_deref(), Some("2023-11-14T22:13:20+00:00"));
    }

    #[test]
    fn test_titles_are_sanitized() {
        let record = normalize_record(&json!({
            "id": "1",
            "title": "\u{1b}[31mSale\u{1b}[0m",
            "parent": "Pro\u{7}mo"
        }))
        .unwrap();
        assert_eq!(record.title, "Sale");
        assert_eq!(record.parent_ref.as_deref(), Some("Promo"));
    }

    #[test]
    fn test_every_text_field_is_sanitized() {
        let record = normalize_record(&json!({
            "id": "1\u{1b}[2J",
            "title": "Hats",
            "status": "act\u{1b}[5mive",
            "thumbnail": {"secure_url": "https://img.example/h.png\u{7}"},
            "createdAt": "2024-01-01\u{1b}]0;pwned\u{7}",
            "createdBy": {"fullName": "Lan\u{0} Nguyen"},
            "description": "Warm\u{1b}[31m hats"
        }))
        .unwrap();

        assert_eq!(record.id.as_str(), "1");
        assert_eq!(record.status, "active");
        assert_eq!(record.thumbnail_ref.as_deref(), Some("https://img.example/h.png"));
        assert_eq!(record.created_at.as_deref(), Some("2024-01-01"));
        assert_eq!(record.created_by_name.as_deref(), Some("Lan Nguyen"));
        assert_eq!(record.description.as_deref(), Some("Warm hats"));
        assert!(record.is_active());
    }

    #[test]
    fn test_control_only_title_is_skipped() {
        assert!(normalize_record(&json!({"id": "1", "title": "\u{1b}[0m\u{7}"})).is_none());
    }

    #[test]
    fn test_records_without_id_or_title_are_skipped() {
        let body = json!([
            {"id": "1", "title": "Shoes"},
            {"title": "No id"},
            {"id": "3"},
            {"id": "4", "title": "   "},
            "not an object",
            {"id": "5", "title": "Boots", "parent": "Shoes"}
        ])
        .to_string();

        let records = parse_records(&body).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "5"]);
    }
}
