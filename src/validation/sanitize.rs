//! Free-text cleaning applied to request fields before they are handed to
//! the data layer. This is not an HTML sanitizer; it removes the handful of
//! fragments that have no business in any of our text columns.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static JS_SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)javascript:").expect("invalid regex"));

static EVENT_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+=").expect("invalid regex"));

/// Clean a JSON value for storage as free text. Non-string values reduce to
/// the empty string. Strings are trimmed, then stripped of angle brackets,
/// `javascript:` scheme fragments (any case) and inline event-handler
/// patterns (`onload=`, `onclick=`, ...). The three removals target
/// non-overlapping patterns, so their order does not matter.
pub fn sanitize(value: &Value) -> String {
    match value.as_str() {
        Some(s) => sanitize_str(s),
        None => String::new(),
    }
}

/// String-slice variant of [`sanitize`].
pub fn sanitize_str(input: &str) -> String {
    let without_angles: String = input
        .trim()
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .collect();
    let without_scheme = JS_SCHEME.replace_all(&without_angles, "");
    EVENT_ATTR.replace_all(&without_scheme, "").into_owned()
}
