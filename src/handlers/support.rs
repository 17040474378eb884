//! Shared helpers for the per-resource handlers: body unwrapping, path id
//! parsing, and extraction of sanitized values for procedure parameters.

use axum::Json;
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;
use crate::validation::{sanitize, ValidationReport};

/// Unwrap an optional JSON body. An absent or unparseable body validates as
/// a payload with every field missing, so the response is a field-level
/// validation envelope rather than a transport error.
pub fn json_body(payload: Option<Json<Value>>) -> Value {
    payload.map(|Json(value)| value).unwrap_or(Value::Null)
}

/// Field accessor that treats an absent key (or a non-object payload) as
/// JSON null.
pub fn field_value(payload: &Value, key: &str) -> Value {
    payload.get(key).cloned().unwrap_or(Value::Null)
}

/// Turn a failed validation report into the 400 envelope.
pub fn ensure_valid(report: ValidationReport) -> Result<(), ApiError> {
    if report.valid {
        Ok(())
    } else {
        Err(report.into())
    }
}

/// Parse a numeric path id, rejecting absent or non-numeric values before
/// any data work happens.
pub fn parse_numeric_id(raw: &str, entity: &str) -> Result<i64, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{} id is required", entity)));
    }

    trimmed
        .parse::<i64>()
        .map_err(|_| ApiError::validation(format!("{} id must be numeric", entity)))
}

/// Parse a UUID path id.
pub fn parse_uuid_id(raw: &str, entity: &str) -> Result<Uuid, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{} id is required", entity)));
    }

    Uuid::parse_str(trimmed)
        .map_err(|_| ApiError::validation(format!("{} id must be a valid uuid", entity)))
}

/// Pull the single expected row out of a procedure result; an empty result
/// means the record does not exist.
pub fn first_row(result: Value, entity: &str) -> Result<Value, ApiError> {
    match result {
        Value::Array(mut rows) if !rows.is_empty() => Ok(rows.remove(0)),
        _ => Err(ApiError::not_found(format!("{} not found", entity))),
    }
}

/// Sanitized text for a present field; `None` when absent or blank after
/// cleaning, which renders as SQL NULL.
pub fn optional_text(payload: &Value, key: &str) -> Option<String> {
    let value = payload.get(key)?;
    let cleaned = sanitize(value);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

pub fn optional_int(payload: &Value, key: &str) -> Option<i64> {
    match payload.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn optional_decimal(payload: &Value, key: &str) -> Option<Decimal> {
    match payload.get(key)? {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn optional_uuid(payload: &Value, key: &str) -> Option<Uuid> {
    payload
        .get(key)?
        .as_str()
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
}
