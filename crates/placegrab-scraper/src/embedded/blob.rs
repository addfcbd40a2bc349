//! Locates the hydration state blob inside server-rendered markup.
//!
//! The page assigns a JSON object literal to a global before the client
//! bundle runs:
//!
//! ```text
//! <script>window.__APOLLO_STATE__ = {"ROOT_QUERY": {...}, "PlaceDetailBase:123": {...}};</script>
//! ```
//!
//! The object is cut out with a string-aware brace scan; no HTML parsing is
//! involved.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::StrategyError;

static STATE_ASSIGNMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"window\.__APOLLO_STATE__\s*=\s*").expect("valid regex")
});

/// Finds the assigned object literal, requiring it to be followed by `;` or
/// `</script>` so a truncated page is not mistaken for a complete blob.
pub(super) fn locate_state_blob(html: &str) -> Option<&str> {
    STATE_ASSIGNMENT_RE.find_iter(html).find_map(|m| {
        let rest = &html[m.end()..];
        let object = extract_balanced_object(rest)?;
        let tail = rest[object.len()..].trim_start();
        (tail.starts_with(';') || tail.starts_with("</script>")).then_some(object)
    })
}

/// Locates and parses the state blob.
///
/// # Errors
///
/// [`StrategyError::MissingStateBlob`] when no assignment is present and
/// [`StrategyError::Deserialize`] when the object text is not valid JSON.
pub(super) fn parse_state_blob(html: &str) -> Result<Value, StrategyError> {
    let raw = locate_state_blob(html).ok_or(StrategyError::MissingStateBlob)?;
    serde_json::from_str(raw).map_err(|source| StrategyError::Deserialize {
        context: "embedded state blob".to_owned(),
        source,
    })
}

/// Returns the shortest prefix of `s` that is a complete `{...}` object,
/// tracking string literals and escapes. Only a `}` at depth 0 closes it.
fn extract_balanced_object(s: &str) -> Option<&str> {
    if !s.starts_with('{') {
        return None;
    }
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escape = false;
    for (i, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if in_string {
            match c {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            ']' => depth -= 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
