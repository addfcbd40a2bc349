//! Field normalization shared by every strategy.
//!
//! Strategies hand raw upstream values to these helpers so that the merged
//! record has one text convention (trimmed, single-spaced, blank = absent)
//! regardless of where a field came from.

use std::collections::HashSet;

use placegrab_core::{MenuItem, MenuPrice};
use serde_json::Value;

/// Trims and collapses internal whitespace runs. Blank input becomes `None`.
pub(crate) fn clean_text(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// Like [`clean_text`] but keeps line breaks, which descriptions use as
/// paragraph separators. Runs of blank lines collapse to one.
pub(crate) fn clean_multiline(raw: &str) -> Option<String> {
    let lines: Vec<String> = raw
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();

    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    for line in &lines {
        if line.is_empty() && out.last().is_none_or(|prev| prev.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }

    let joined = out.join("\n");
    (!joined.is_empty()).then_some(joined)
}

/// Extracts a cleaned string from a JSON value. Numbers are rendered as text
/// since upstream sends IDs and phone fragments either way.
pub(crate) fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => clean_text(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads `key` from a JSON object as a cleaned string.
pub(crate) fn str_field(obj: &Value, key: &str) -> Option<String> {
    obj.get(key).and_then(value_as_string)
}

/// Interprets a JSON price value, numeric or textual.
pub(crate) fn value_as_price(value: &Value) -> Option<MenuPrice> {
    match value {
        Value::Number(n) => MenuPrice::parse(&n.to_string()),
        Value::String(s) => MenuPrice::parse(s),
        _ => None,
    }
}

/// Builds a menu item from raw parts, or `None` when the name is blank.
pub(crate) fn menu_item(
    name: &str,
    price: Option<MenuPrice>,
    description: Option<&str>,
) -> Option<MenuItem> {
    Some(MenuItem {
        name: clean_text(name)?,
        price,
        description: description.and_then(clean_multiline),
    })
}

/// Drops repeated (name, price) pairs, keeping first-seen order.
///
/// The same dish often appears under both a "representative" group and its
/// regular section; the duplicate carries no new information.
pub(crate) fn dedupe_menu(items: Vec<MenuItem>) -> Vec<MenuItem> {
    let mut seen: HashSet<(String, Option<String>)> = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            let key = (
                item.name.clone(),
                item.price.as_ref().map(ToString::to_string),
            );
            seen.insert(key)
        })
        .collect()
}

/// Cleans and de-duplicates review keywords, keeping first-seen order.
pub(crate) fn dedupe_keywords<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|k| clean_text(k.as_ref()))
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

/// Normalizes a phone number's separators. Anything without at least one
/// digit is rejected.
pub(crate) fn clean_phone(raw: &str) -> Option<String> {
    let cleaned = clean_text(raw)?;
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(cleaned.replace(['.', ' '], "-"))
}
