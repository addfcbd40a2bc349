//! Maps query-endpoint envelopes onto [`PlaceRecord`] fields.
//!
//! Every access is optional: a missing root, a `null` sub-tree or an
//! unexpected type just leaves the corresponding field empty.

use placegrab_core::{EntityType, PlaceRecord};
use serde_json::Value;

use super::operations::{detail_root, Operation, OperationKind};
use crate::normalize::{
    clean_multiline, dedupe_keywords, dedupe_menu, menu_item, str_field, value_as_price,
};

/// What a batch response amounted to, before the caller decides between an
/// (possibly empty) record and a typed not-found.
#[derive(Debug, Default)]
pub(super) struct BatchOutcome {
    pub record: PlaceRecord,
    /// Operations whose envelope carried a `NOT_FOUND` error or null data.
    pub not_found: Vec<&'static str>,
}

/// Parses the endpoint's response body for `ops`.
///
/// Batched requests are answered with an array; a single envelope object is
/// accepted too and matched against the first operation.
pub(super) fn parse_batch(ops: &[Operation], body: &Value, entity_type: EntityType) -> BatchOutcome {
    let envelopes: Vec<&Value> = match body {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![body],
        _ => Vec::new(),
    };

    let root = detail_root(entity_type);
    let mut outcome = BatchOutcome::default();

    for (op, envelope) in ops.iter().zip(envelopes) {
        if is_not_found(envelope) {
            tracing::debug!(operation = op.operation_name, "query operation returned not found");
            outcome.not_found.push(op.operation_name);
            continue;
        }

        let data = envelope.get("data").unwrap_or(&Value::Null);
        match op.kind {
            OperationKind::BaseInfo => apply_base(&mut outcome.record, data.get(root)),
            OperationKind::Menu => apply_menus(&mut outcome.record, data.get(root)),
            OperationKind::ReviewKeywords => apply_keywords(&mut outcome.record, data),
        }
    }

    outcome
}

/// A typed `NOT_FOUND` error, or a `data` object whose every root is null.
fn is_not_found(envelope: &Value) -> bool {
    let typed = envelope
        .get("errors")
        .and_then(Value::as_array)
        .is_some_and(|errors| {
            errors.iter().any(|err| {
                let code = err
                    .pointer("/extensions/code")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let message = err.get("message").and_then(Value::as_str).unwrap_or_default();
                code.eq_ignore_ascii_case("NOT_FOUND") || message.contains("not found")
            })
        });
    if typed {
        return true;
    }

    match envelope.get("data") {
        None | Some(Value::Null) => true,
        Some(Value::Object(roots)) => roots.values().all(Value::is_null),
        Some(_) => false,
    }
}

fn apply_base(record: &mut PlaceRecord, detail: Option<&Value>) {
    let Some(base) = detail.and_then(|d| d.get("base")) else {
        return;
    };
    record.name = str_field(base, "name");
    record.category = str_field(base, "category");
    record.description = base
        .get("description")
        .and_then(Value::as_str)
        .and_then(clean_multiline);
}

fn apply_menus(record: &mut PlaceRecord, detail: Option<&Value>) {
    let Some(menus) = detail.and_then(|d| d.get("menus")).and_then(Value::as_array) else {
        return;
    };
    let items = menus
        .iter()
        .filter_map(|menu| {
            let name = menu.get("name").and_then(Value::as_str)?;
            let price = menu.get("price").and_then(value_as_price);
            let description = menu.get("description").and_then(Value::as_str);
            menu_item(name, price, description)
        })
        .collect();
    record.menu_items = dedupe_menu(items);
}

fn apply_keywords(record: &mut PlaceRecord, data: &Value) {
    let Some(details) = data
        .pointer("/visitorReviewStats/analysis/votedKeyword/details")
        .and_then(Value::as_array)
    else {
        return;
    };
    record.review_keywords = dedupe_keywords(
        details
            .iter()
            .filter_map(|d| d.get("displayName").and_then(Value::as_str)),
    );
}
