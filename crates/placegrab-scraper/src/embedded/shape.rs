//! Duck-typed search over the hydration state graph.
//!
//! The state is a flat-ish map from opaque cache keys (`"PlaceDetailBase:123"`,
//! `"Menu:123_4"`, ...) to entity fragments, and both the key scheme and the
//! nesting change between deployments. Nothing here looks up a fixed path:
//! each matcher is a predicate over an object's own fields, applied to every
//! object in the graph in breadth-first document order.

use std::collections::{BTreeSet, VecDeque};

use placegrab_core::{MenuItem, PlaceRecord};
use serde_json::{Map, Value};

use crate::normalize::{
    clean_multiline, clean_phone, dedupe_keywords, dedupe_menu, menu_item, value_as_price,
    value_as_string,
};

const NAME_KEYS: [&str; 3] = ["name", "businessName", "placeName"];
const CATEGORY_KEYS: [&str; 3] = ["category", "categoryName", "businessCategory"];
const PHONE_KEYS: [&str; 3] = ["phone", "virtualPhone", "tel"];
const MAX_DEPTH: usize = 32;

/// Visits every object node, shallowest first.
fn objects(root: &Value) -> Vec<&Map<String, Value>> {
    let mut out = Vec::new();
    let mut queue: VecDeque<(&Value, usize)> = VecDeque::from([(root, 0)]);
    while let Some((node, depth)) = queue.pop_front() {
        if depth > MAX_DEPTH {
            continue;
        }
        match node {
            Value::Object(map) => {
                out.push(map);
                queue.extend(map.values().map(|v| (v, depth + 1)));
            }
            Value::Array(items) => queue.extend(items.iter().map(|v| (v, depth + 1))),
            _ => {}
        }
    }
    out
}

fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| obj.get(*key).and_then(value_as_string))
}

fn has_text(obj: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter().any(|key| {
        obj.get(*key)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty())
    })
}

/// An object that carries both a name-like and a category-like string.
fn is_business_record(obj: &Map<String, Value>) -> bool {
    has_text(obj, &NAME_KEYS) && has_text(obj, &CATEGORY_KEYS)
}

/// Picks the business record. When several objects qualify (related
/// listings are often embedded too), the one whose `id` equals the listing
/// ID wins; otherwise the shallowest, earliest one.
pub(super) fn find_business_record<'a>(
    root: &'a Value,
    canonical_id: &str,
) -> Option<&'a Map<String, Value>> {
    let candidates: Vec<_> = objects(root)
        .into_iter()
        .filter(|obj| is_business_record(obj))
        .collect();

    candidates
        .iter()
        .find(|obj| {
            obj.get("id").is_some_and(|id| match id {
                Value::String(s) => s == canonical_id,
                Value::Number(n) => n.to_string() == canonical_id,
                _ => false,
            })
        })
        .or_else(|| candidates.first())
        .copied()
}

/// Objects with a `name` and a `price` key, and no category (which would
/// make them a listing rather than a dish).
pub(super) fn find_menu_items(root: &Value) -> Vec<MenuItem> {
    let items = objects(root)
        .into_iter()
        .filter(|obj| obj.contains_key("price") && !has_text(obj, &CATEGORY_KEYS))
        .filter_map(|obj| {
            let name = obj.get("name").and_then(Value::as_str)?;
            let price = obj.get("price").and_then(value_as_price);
            let description = obj.get("description").and_then(Value::as_str);
            menu_item(name, price, description)
        })
        .collect();
    dedupe_menu(items)
}

/// Voted review keywords: `{displayName, count}` pairs, or any object typed
/// as a keyword that carries `keyword`/`displayName` text.
pub(super) fn find_review_keywords(root: &Value) -> Vec<String> {
    let raw = objects(root).into_iter().filter_map(|obj| {
        let typed_keyword = obj
            .get("__typename")
            .and_then(Value::as_str)
            .is_some_and(|t| t.contains("Keyword"));
        let counted = obj.get("count").is_some_and(Value::is_number);
        let display = obj.get("displayName").and_then(Value::as_str);
        match (display, counted, typed_keyword) {
            (Some(text), true, _) | (Some(text), _, true) => Some(text.to_owned()),
            (None, _, true) => obj.get("keyword").and_then(Value::as_str).map(str::to_owned),
            _ => None,
        }
    });
    dedupe_keywords(raw)
}

/// Every distinct `__typename` in the graph.
pub(super) fn typename_inventory(root: &Value) -> BTreeSet<String> {
    objects(root)
        .into_iter()
        .filter_map(|obj| obj.get("__typename").and_then(Value::as_str))
        .map(str::to_owned)
        .collect()
}

/// Builds a partial record from the whole state graph.
pub(super) fn record_from_state(root: &Value, canonical_id: &str) -> PlaceRecord {
    let mut record = PlaceRecord::default();

    if let Some(business) = find_business_record(root, canonical_id) {
        record.name = first_text(business, &NAME_KEYS);
        record.category = first_text(business, &CATEGORY_KEYS);
        record.description = business
            .get("description")
            .and_then(Value::as_str)
            .and_then(clean_multiline);
        record.phone = PHONE_KEYS
            .iter()
            .filter_map(|key| business.get(*key).and_then(Value::as_str))
            .find_map(clean_phone);
    }

    record.menu_items = find_menu_items(root);
    record.review_keywords = find_review_keywords(root);
    record
}

#[cfg(test)]
#[path = "shape_test.rs"]
mod tests;
