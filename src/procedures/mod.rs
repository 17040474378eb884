//! Stored-procedure gateway. Every endpoint delegates its data work to a
//! named procedure in the registry database; this module is the one place
//! that knows how to call them.

pub mod postgres;

pub use postgres::PgProcedureGateway;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

/// A single named-parameter value. Variants mirror the SQL types the
/// registry procedures accept.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Int(i64),
    Decimal(Decimal),
    Bool(bool),
    Json(Value),
    Null,
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value as i64)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<Decimal> for ParamValue {
    fn from(value: Decimal) -> Self {
        ParamValue::Decimal(value)
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        ParamValue::Json(value)
    }
}

impl From<Uuid> for ParamValue {
    fn from(value: Uuid) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => ParamValue::Null,
        }
    }
}

/// Insertion-ordered named parameters for a procedure call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcedureParams {
    fields: Vec<(String, ParamValue)>,
}

impl ProcedureParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.fields.push((name.to_string(), value.into()));
        self
    }

    pub fn entries(&self) -> &[(String, ParamValue)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Why a procedure call failed. The kind is fixed here, at the throw site;
/// callers never inspect message text.
#[derive(Debug, thiserror::Error)]
pub enum ProcedureError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("Invalid procedure name: {0}")]
    InvalidName(String),
}

#[async_trait]
pub trait ProcedureGateway: Send + Sync {
    /// Invoke a stored procedure by name with named parameters, returning
    /// the result rows as a JSON array.
    async fn invoke(&self, procedure: &str, params: ProcedureParams)
        -> Result<Value, ProcedureError>;

    /// Connectivity probe backing the health endpoint.
    async fn health(&self) -> Result<(), ProcedureError>;
}
