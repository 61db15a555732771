//! In-memory search, filter and pagination over JSON records.
//!
//! These back the development fallback: the same [`ListParams`] that would
//! be sent to the backend are applied to a fixture array instead.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::descriptor::Transition;
use super::envelope::{Page, Pagination};
use crate::query::ListParams;

/// Returns a field as the string it would be compared as.
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn matches_search(record: &Value, term: &str, search_fields: &[&str]) -> bool {
    let term = term.trim().to_lowercase();
    search_fields.iter().any(|field| {
        record
            .get(*field)
            .and_then(field_text)
            .is_some_and(|text| text.to_lowercase().contains(&term))
    })
}

/// Equality on scalar fields; on array fields, any element equal to any of
/// the comma-separated wanted values.
fn matches_value(field: &Value, wanted: &str) -> bool {
    match field {
        Value::Array(elements) => wanted.split(',').map(str::trim).any(|want| {
            elements
                .iter()
                .filter_map(field_text)
                .any(|element| element == want)
        }),
        other => field_text(other).is_some_and(|text| text == wanted),
    }
}

fn matches_filter(record: &Value, name: &str, wanted: &str) -> bool {
    if let Some(field) = record.get(name) {
        return matches_value(field, wanted);
    }
    if let Some(base) = name.strip_suffix("From").filter(|b| !b.is_empty()) {
        return record
            .get(base)
            .and_then(field_text)
            .is_some_and(|text| text.as_str() >= wanted);
    }
    if let Some(base) = name.strip_suffix("To").filter(|b| !b.is_empty()) {
        // Compare only the leading part so "2024-09-30" includes that whole day.
        return record.get(base).and_then(field_text).is_some_and(|text| {
            let head = text.get(..wanted.len()).unwrap_or(text.as_str());
            head <= wanted
        });
    }
    false
}

/// Slices one page out of `items`. Page 0 is treated as page 1.
pub fn paginate<T>(items: Vec<T>, page: u32, limit: u32) -> Page<T> {
    let page = page.max(1);
    let total = items.len() as u64;
    let start = (page as usize - 1).saturating_mul(limit as usize);
    let items = items.into_iter().skip(start).take(limit as usize).collect();
    Page {
        items,
        pagination: Pagination::compute(page, limit, total),
    }
}

/// Applies search, filters and pagination to a set of records.
///
/// - search: case-insensitive substring match on any of `search_fields`
/// - filters: equality on the field of the same name; `<field>From` and
///   `<field>To` are inclusive lower/upper bounds on ISO-8601 text
/// - a record missing a filtered field does not match
pub fn filter_records(records: &[Value], params: &ListParams, search_fields: &[&str]) -> Page<Value> {
    let matching: Vec<Value> = records
        .iter()
        .filter(|record| {
            params
                .search
                .as_deref()
                .is_none_or(|term| matches_search(record, term, search_fields))
                && params
                    .filters
                    .iter()
                    .all(|(name, wanted)| matches_filter(record, name, wanted))
        })
        .cloned()
        .collect();
    paginate(matching, params.page, params.limit)
}

/// Shallow-merges the non-null fields of `patch` over `record`.
pub fn merge_fields(record: &Value, patch: &Value) -> Value {
    let mut merged = record.as_object().cloned().unwrap_or_default();
    if let Some(patch) = patch.as_object() {
        for (name, value) in patch {
            if !value.is_null() {
                merged.insert(name.clone(), value.clone());
            }
        }
    }
    Value::Object(merged)
}

/// Turns a create-request body into a record with an id and timestamps.
pub fn synthesize_record(body: &Value, id: &str, now: DateTime<Utc>) -> Value {
    let mut fields = Map::new();
    fields.insert("id".to_string(), Value::String(id.to_string()));
    fields.insert("createdAt".to_string(), Value::String(now.to_rfc3339()));
    fields.insert("updatedAt".to_string(), Value::String(now.to_rfc3339()));
    merge_fields(&Value::Object(fields), body)
}

/// Rewrites the status fields a state transition changes.
pub fn apply_transition(record: &Value, transition: Transition, now: DateTime<Utc>) -> Value {
    let (status, allow_submissions) = match transition {
        Transition::Publish => ("published", true),
        Transition::Unpublish => ("draft", false),
        Transition::CloseSubmissions => ("closed", false),
    };
    let patch = serde_json::json!({
        "status": status,
        "allowSubmissions": allow_submissions,
        "updatedAt": now.to_rfc3339(),
    });
    merge_fields(record, &patch)
}
