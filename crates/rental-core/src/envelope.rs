//! # Response Envelopes
//!
//! The backend is not consistent about how it wraps responses. This module
//! is the single place that knows every shape; everything above it works
//! with plain models and [`Page`].
//!
//! ## Known Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Shape              Example body                         Normalized to  │
//! │  ─────────────────  ───────────────────────────────────  ─────────────  │
//! │  Wrapped            {"success": true, "data": ...}       data           │
//! │  Rejected           {"success": false, "message": "..."} CoreError      │
//! │  SkipLimitPage      {"items": [], "total", "skip",       Page<T>        │
//! │                      "limit"}                                           │
//! │  PageSizePage       {"items": [], "total", "page",       Page<T>        │
//! │                      "size", "pages"}                                   │
//! │  Report             {"rentals": [], "total", "skip",     Page<T> +      │
//! │                      "limit", "summary": {...}}          summary        │
//! │  Array              [ ... ]                              Page<T>        │
//! │  Object             { ... }                              T              │
//! │  Empty              (204 / null)                         ()             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A wrapper around a page (`{"success": true, "data": {"items": ...}}`) is
//! unwrapped once and then detected again.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};
use crate::types::Page;

/// Fallback when an error body carries no usable text.
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

/// Detected response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    Wrapped,
    Rejected,
    SkipLimitPage,
    PageSizePage,
    Report,
    Array,
    Object,
    Scalar,
    Empty,
}

impl Envelope {
    /// Inspects a body without consuming it.
    pub fn detect(body: &Value) -> Envelope {
        match body {
            Value::Null => Envelope::Empty,
            Value::Array(_) => Envelope::Array,
            Value::Object(map) => {
                if let Some(success) = map.get("success").and_then(Value::as_bool) {
                    return if success {
                        Envelope::Wrapped
                    } else {
                        Envelope::Rejected
                    };
                }
                if map.get("rentals").is_some_and(Value::is_array) {
                    Envelope::Report
                } else if map.get("items").is_some_and(Value::is_array) {
                    if map.contains_key("page") && map.contains_key("size") {
                        Envelope::PageSizePage
                    } else {
                        Envelope::SkipLimitPage
                    }
                } else {
                    Envelope::Object
                }
            }
            _ => Envelope::Scalar,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(
            self,
            Envelope::SkipLimitPage | Envelope::PageSizePage | Envelope::Report | Envelope::Array
        )
    }
}

// =============================================================================
// Unwrapping
// =============================================================================

/// Strips a `{success, data}` wrapper if present.
///
/// A `success: false` wrapper becomes [`CoreError::Rejected`] carrying the
/// server's message.
pub fn unwrap_data(body: Value) -> CoreResult<Value> {
    match Envelope::detect(&body) {
        Envelope::Wrapped => match body {
            Value::Object(mut map) => Ok(map.remove("data").unwrap_or(Value::Null)),
            other => Ok(other),
        },
        Envelope::Rejected => Err(CoreError::Rejected {
            message: error_message(&body).unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
        }),
        _ => Ok(body),
    }
}

/// Decodes a single model from any body shape.
pub fn into_model<T: DeserializeOwned>(body: Value) -> CoreResult<T> {
    let data = unwrap_data(body)?;
    serde_json::from_value(data).map_err(|e| CoreError::decode(std::any::type_name::<T>(), e))
}

/// Decodes a list from any list shape into a [`Page`].
pub fn into_page<T: DeserializeOwned>(body: Value) -> CoreResult<Page<T>> {
    let data = unwrap_data(body)?;
    match data {
        Value::Array(items) => {
            let items = decode_items::<T>(items)?;
            Ok(Page::from_items(items))
        }
        Value::Object(map) => page_from_object(map),
        Value::Null => Ok(Page::default()),
        other => Err(CoreError::UnexpectedShape(format!(
            "expected a list, got {}",
            kind_of(&other)
        ))),
    }
}

/// Decodes a report envelope: a page of rows plus an optional `summary`.
pub fn into_report<T, S>(body: Value) -> CoreResult<(Page<T>, Option<S>)>
where
    T: DeserializeOwned,
    S: DeserializeOwned,
{
    let data = unwrap_data(body)?;
    let summary = match data.get("summary") {
        Some(Value::Null) | None => None,
        Some(raw) => Some(
            serde_json::from_value(raw.clone())
                .map_err(|e| CoreError::decode(std::any::type_name::<S>(), e))?,
        ),
    };
    let page = into_page(data)?;
    Ok((page, summary))
}

fn page_from_object<T: DeserializeOwned>(mut map: Map<String, Value>) -> CoreResult<Page<T>> {
    let rows = map
        .remove("items")
        .or_else(|| map.remove("rentals"))
        .or_else(|| map.remove("data").filter(Value::is_array));

    let items = match rows {
        Some(Value::Array(items)) => decode_items::<T>(items)?,
        _ => {
            return Err(CoreError::UnexpectedShape(
                "object has no items, rentals or data list".into(),
            ))
        }
    };

    let count = items.len() as u64;
    let total = read_u64(&map, "total").unwrap_or(count);

    let (skip, limit) = match (read_u64(&map, "page"), read_u64(&map, "size")) {
        (Some(page), Some(size)) => (page.saturating_sub(1).saturating_mul(size), size),
        _ => (
            read_u64(&map, "skip").unwrap_or(0),
            read_u64(&map, "limit").unwrap_or(count),
        ),
    };

    Ok(Page {
        items,
        total,
        skip,
        limit,
    })
}

fn decode_items<T: DeserializeOwned>(items: Vec<Value>) -> CoreResult<Vec<T>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            serde_json::from_value(raw).map_err(|e| {
                CoreError::decode(
                    format!("{}[{}]", std::any::type_name::<T>(), index),
                    e,
                )
            })
        })
        .collect()
}

fn read_u64(map: &Map<String, Value>, key: &str) -> Option<u64> {
    map.get(key).and_then(Value::as_u64)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// Error Bodies
// =============================================================================

/// Extracts a user-facing message from an error body.
///
/// ## Lookup Order
/// 1. `detail` as a string
/// 2. `detail` as a FastAPI validation list: the first entry's `msg`
///    (every entry still lands in [`field_errors`])
/// 3. `message`
/// 4. `error` as a string, or `error.message`
pub fn error_message(body: &Value) -> Option<String> {
    let text = |v: &Value| v.as_str().map(str::trim).filter(|s| !s.is_empty()).map(String::from);

    if let Some(detail) = body.get("detail") {
        if let Some(s) = text(detail) {
            return Some(s);
        }
        if let Some(first) = detail
            .as_array()
            .and_then(|entries| entries.iter().find_map(|entry| entry.get("msg").and_then(text)))
        {
            return Some(first);
        }
        if let Some(s) = detail.get("message").and_then(text) {
            return Some(s);
        }
    }

    if let Some(s) = body.get("message").and_then(text) {
        return Some(s);
    }

    match body.get("error") {
        Some(err) => text(err).or_else(|| err.get("message").and_then(text)),
        None => None,
    }
}

/// Collects per-field errors from an error body.
///
/// Reads an `errors` map (`{"field": "msg"}` or `{"field": ["msg", ...]}`)
/// and FastAPI `detail` entries whose `loc` ends in a field name.
pub fn field_errors(body: &Value) -> BTreeMap<String, Vec<String>> {
    let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();

    if let Some(errors) = body.get("errors").and_then(Value::as_object) {
        for (field, raw) in errors {
            let messages: Vec<String> = match raw {
                Value::String(s) => vec![s.clone()],
                Value::Array(list) => list
                    .iter()
                    .filter_map(|m| m.as_str().map(String::from))
                    .collect(),
                _ => Vec::new(),
            };
            if !messages.is_empty() {
                out.entry(field.clone()).or_default().extend(messages);
            }
        }
    }

    if let Some(entries) = body.get("detail").and_then(Value::as_array) {
        for entry in entries {
            let field = entry
                .get("loc")
                .and_then(Value::as_array)
                .and_then(|loc| loc.last())
                .and_then(Value::as_str);
            let msg = entry.get("msg").and_then(Value::as_str);
            if let (Some(field), Some(msg)) = (field, msg) {
                out.entry(field.to_string()).or_default().push(msg.to_string());
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Brand, Category, RentalDueToday, RentalsDueSummary};
    use assert_matches::assert_matches;
    use serde_json::json;

    fn brand(id: &str) -> Value {
        json!({"id": id, "brand_name": format!("Brand {}", id)})
    }

    #[test]
    fn test_detect_shapes() {
        assert_eq!(Envelope::detect(&json!(null)), Envelope::Empty);
        assert_eq!(Envelope::detect(&json!([])), Envelope::Array);
        assert_eq!(Envelope::detect(&json!({"success": true, "data": 1})), Envelope::Wrapped);
        assert_eq!(Envelope::detect(&json!({"success": false})), Envelope::Rejected);
        assert_eq!(
            Envelope::detect(&json!({"items": [], "total": 0, "skip": 0, "limit": 10})),
            Envelope::SkipLimitPage
        );
        assert_eq!(
            Envelope::detect(&json!({"items": [], "total": 0, "page": 1, "size": 10})),
            Envelope::PageSizePage
        );
        assert_eq!(Envelope::detect(&json!({"rentals": [], "total": 0})), Envelope::Report);
        assert_eq!(Envelope::detect(&json!({"id": "x"})), Envelope::Object);
        assert_eq!(Envelope::detect(&json!("ok")), Envelope::Scalar);
        assert!(Envelope::Report.is_list());
        assert!(!Envelope::Object.is_list());
    }

    #[test]
    fn test_raw_array_becomes_page() {
        let page: Page<Brand> = into_page(json!([brand("a"), brand("b")])).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.skip, 0);
        assert_eq!(page.items[1].id, "b");
    }

    #[test]
    fn test_skip_limit_page() {
        let body = json!({"items": [brand("a")], "total": 7, "skip": 5, "limit": 5});
        let page: Page<Brand> = into_page(body).unwrap();
        assert_eq!((page.total, page.skip, page.limit), (7, 5, 5));
    }

    #[test]
    fn test_page_size_page_converts_to_skip() {
        let body = json!({"items": [brand("a")], "total": 41, "page": 3, "size": 20, "pages": 3});
        let page: Page<Brand> = into_page(body).unwrap();
        assert_eq!((page.skip, page.limit), (40, 20));
    }

    #[test]
    fn test_huge_page_and_size_saturate() {
        let body = json!({"items": [], "total": 0, "page": u64::MAX, "size": u64::MAX});
        let page: Page<Brand> = into_page(body).unwrap();
        assert_eq!((page.skip, page.limit), (u64::MAX, u64::MAX));
    }

    #[test]
    fn test_wrapped_page_is_unwrapped_once() {
        let body = json!({"success": true, "data": {"items": [brand("a")], "total": 1, "skip": 0, "limit": 20}});
        let page: Page<Brand> = into_page(body).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page.limit, 20);
    }

    #[test]
    fn test_wrapped_model() {
        let body = json!({"success": true, "data": {
            "id": "c1", "category_name": "Cameras", "category_path": "Cameras"
        }});
        let category: Category = into_model(body).unwrap();
        assert_eq!(category.category_level, 0);
    }

    #[test]
    fn test_rejected_wrapper_carries_message() {
        let err = into_model::<Brand>(json!({"success": false, "message": "Brand is locked"}))
            .unwrap_err();
        assert_matches!(err, CoreError::Rejected { message } if message == "Brand is locked");
    }

    #[test]
    fn test_report_with_summary() {
        let body = json!({
            "success": true,
            "data": {
                "rentals": [{
                    "transaction_id": "t1", "transaction_number": "R-1",
                    "customer_id": "c1", "customer_name": "Ada"
                }],
                "total": 1, "skip": 0, "limit": 100,
                "summary": {"total_due_today": 1, "total_overdue": 0}
            }
        });
        let (page, summary): (Page<RentalDueToday>, Option<RentalsDueSummary>) =
            into_report(body).unwrap();
        assert_eq!(page.items[0].customer_name, "Ada");
        assert_eq!(summary.unwrap().total_due_today, 1);
    }

    #[test]
    fn test_null_body_is_empty_page() {
        let page: Page<Brand> = into_page(Value::Null).unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_bad_row_reports_index() {
        let err = into_page::<Brand>(json!([brand("a"), {"id": 5}])).unwrap_err();
        assert_matches!(err, CoreError::Decode { target, .. } if target.ends_with("[1]"));
    }

    #[test]
    fn test_scalar_is_not_a_list() {
        assert_matches!(into_page::<Brand>(json!(3)), Err(CoreError::UnexpectedShape(_)));
    }

    #[test]
    fn test_error_message_lookup_order() {
        assert_eq!(
            error_message(&json!({"detail": "Category already exists", "message": "x"})).as_deref(),
            Some("Category already exists")
        );
        assert_eq!(
            error_message(&json!({"detail": [
                {"loc": ["body", "email"], "msg": "value is not a valid email address"},
                {"loc": ["body", "password"], "msg": "field required"}
            ]}))
            .as_deref(),
            Some("value is not a valid email address")
        );
        assert_eq!(error_message(&json!({"message": "Nope"})).as_deref(), Some("Nope"));
        assert_eq!(
            error_message(&json!({"error": {"message": "Boom"}})).as_deref(),
            Some("Boom")
        );
        assert_eq!(error_message(&json!({"detail": "  "})), None);
        assert_eq!(error_message(&json!({})), None);
    }

    #[test]
    fn test_field_errors_from_both_sources() {
        let body = json!({
            "errors": {"brand_code": ["Brand code already exists"], "brand_name": "Too long"},
            "detail": [{"loc": ["body", "brand_name"], "msg": "field required"}]
        });
        let fields = field_errors(&body);
        assert_eq!(fields["brand_code"], vec!["Brand code already exists"]);
        assert_eq!(fields["brand_name"], vec!["Too long", "field required"]);
    }
}
