//! Field-level validation predicates and the declaration-ordered rule
//! runner used by every handler.
//!
//! Predicates are pure and total: they answer yes/no over a
//! [`serde_json::Value`] and never panic on odd input. Parameterized checks
//! (`min_length`, `range`, ...) are closure factories so they can sit in the
//! same check list as the plain functions.

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;

use super::document;

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid regex"));

static UUID_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("invalid regex")
});

/// Present and non-blank. Strings must have content after trimming; numbers
/// and booleans count as present; null and missing values do not.
pub fn not_empty(value: &Value) -> bool {
    match value {
        Value::String(s) => !s.trim().is_empty(),
        Value::Number(_) | Value::Bool(_) => true,
        _ => false,
    }
}

/// Trimmed character count at least `n`.
pub fn min_length(n: usize) -> impl Fn(&Value) -> bool {
    move |value| {
        value
            .as_str()
            .map(|s| s.trim().chars().count() >= n)
            .unwrap_or(false)
    }
}

/// Trimmed character count at most `n`. Absent or blank values pass; only
/// an over-long present value fails.
pub fn max_length(n: usize) -> impl Fn(&Value) -> bool {
    move |value| match value {
        Value::Null => true,
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.is_empty() || trimmed.chars().count() <= n
        }
        _ => true,
    }
}

/// Numeric value (or numeric-looking string) within `min..=max`.
pub fn range(min: f64, max: f64) -> impl Fn(&Value) -> bool {
    move |value| match numeric(value) {
        Some(n) => n >= min && n <= max,
        None => false,
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Whole number (or integer-looking string) of at least 1. Fractional
/// values are rejected.
pub fn positive_integer(value: &Value) -> bool {
    matches!(integer(value), Some(n) if n >= 1)
}

/// Whole number (or integer-looking string), zero allowed.
pub fn non_negative_integer(value: &Value) -> bool {
    matches!(integer(value), Some(n) if n >= 0)
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Applies a check only when a value is present; null and blank strings
/// pass. Used for the optional fields of a payload.
pub fn optional<F>(check: F) -> impl Fn(&Value) -> bool
where
    F: Fn(&Value) -> bool + 'static,
{
    move |value| match value {
        Value::Null => true,
        Value::String(s) if s.trim().is_empty() => true,
        _ => check(value),
    }
}

/// Permissive email shape check: something, an `@`, something, a dot,
/// something — with no whitespace or second `@` inside any part. This is a
/// deliberate single-pass shape test, not RFC 5322.
pub fn email(value: &Value) -> bool {
    value.as_str().map(|s| EMAIL_SHAPE.is_match(s)).unwrap_or(false)
}

/// Canonical 8-4-4-4-12 hyphenated UUID, either case.
pub fn uuid(value: &Value) -> bool {
    value.as_str().map(|s| UUID_SHAPE.is_match(s)).unwrap_or(false)
}

/// Monetary amount, zero allowed. Accepts numbers and numeric-looking
/// strings; parsed as a decimal so fractional cents are exact.
pub fn monetary(value: &Value) -> bool {
    matches!(decimal(value), Some(d) if d >= Decimal::ZERO)
}

/// Monetary amount, strictly positive.
pub fn positive_monetary(value: &Value) -> bool {
    matches!(decimal(value), Some(d) if d > Decimal::ZERO)
}

fn decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse::<Decimal>().ok(),
        Value::String(s) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    }
}

/// Array with at least one element.
pub fn non_empty_array(value: &Value) -> bool {
    value.as_array().map(|a| !a.is_empty()).unwrap_or(false)
}

/// Parseable calendar date: RFC 3339 timestamp or plain `YYYY-MM-DD`.
pub fn valid_date(value: &Value) -> bool {
    let Some(s) = value.as_str() else {
        return false;
    };
    let s = s.trim();
    DateTime::parse_from_rfc3339(s).is_ok() || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Valid CPF or CNPJ after stripping formatting.
pub fn tax_document(value: &Value) -> bool {
    value
        .as_str()
        .map(document::is_valid_document)
        .unwrap_or(false)
}

/// One boxed predicate in a field's check chain.
pub type Check = Box<dyn Fn(&Value) -> bool>;

struct FieldSpec {
    name: String,
    value: Value,
    checks: Vec<Check>,
    message: String,
}

/// Declaration-ordered set of field rules. Each field carries its value, a
/// chain of checks run in order (stopping at the first failure), and the
/// message recorded as `"<field>: <message>"` when the chain fails.
#[derive(Default)]
pub struct FieldRules {
    fields: Vec<FieldSpec>,
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, value: Value, checks: Vec<Check>, message: &str) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            value,
            checks,
            message: message.to_string(),
        });
        self
    }

    /// Run every field's chain, collecting failures in declaration order.
    pub fn validate(&self) -> ValidationReport {
        let mut errors = Vec::new();
        for field in &self.fields {
            if !field.checks.iter().all(|check| check(&field.value)) {
                errors.push(format!("{}: {}", field.name, field.message));
            }
        }
        ValidationReport {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Outcome of a [`FieldRules::validate`] run. `valid` holds exactly when
/// `errors` is empty; errors preserve field declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}
