use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};

use super::{ParamValue, ProcedureError, ProcedureGateway, ProcedureParams};

/// Calls registry procedures over a Postgres pool. Each call selects
/// `to_jsonb` over the procedure's result set so the response shape is
/// decided by the procedure, not by this gateway.
pub struct PgProcedureGateway {
    pool: PgPool,
}

impl PgProcedureGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProcedureGateway for PgProcedureGateway {
    async fn invoke(
        &self,
        procedure: &str,
        params: ProcedureParams,
    ) -> Result<Value, ProcedureError> {
        if !is_valid_identifier(procedure) {
            return Err(ProcedureError::InvalidName(procedure.to_string()));
        }

        let sql = render_call(procedure, &params);
        tracing::debug!("Calling procedure: {}", sql);

        let mut query = sqlx::query(&sql);
        for (_, value) in params.entries() {
            query = match value {
                ParamValue::Text(v) => query.bind(v.clone()),
                ParamValue::Int(v) => query.bind(*v),
                ParamValue::Decimal(v) => query.bind(*v),
                ParamValue::Bool(v) => query.bind(*v),
                ParamValue::Json(v) => query.bind(v.clone()),
                ParamValue::Null => query,
            };
        }

        let rows = query.fetch_all(&self.pool).await.map_err(map_sqlx_error)?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            results.push(row.try_get::<Value, _>("row").map_err(map_sqlx_error)?);
        }

        Ok(Value::Array(results))
    }

    async fn health(&self) -> Result<(), ProcedureError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

/// Procedure names come from handler code, never from clients; this check
/// still refuses anything that is not a plain SQL identifier.
fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Quote SQL identifier to prevent injection
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Render the call as a named-argument SELECT. Null parameters are inlined
/// as SQL NULL so bind positions stay contiguous for the present values.
fn render_call(procedure: &str, params: &ProcedureParams) -> String {
    let mut fragments = Vec::new();
    let mut position = 0usize;

    for (name, value) in params.entries() {
        match value {
            ParamValue::Null => {
                fragments.push(format!("{} := NULL", quote_identifier(name)));
            }
            _ => {
                position += 1;
                fragments.push(format!("{} := ${}", quote_identifier(name), position));
            }
        }
    }

    format!(
        "SELECT to_jsonb(r) AS \"row\" FROM {}({}) AS r",
        quote_identifier(procedure),
        fragments.join(", ")
    )
}

fn map_sqlx_error(err: sqlx::Error) -> ProcedureError {
    if matches!(err, sqlx::Error::RowNotFound) {
        return ProcedureError::NotFound("record not found".to_string());
    }

    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => return ProcedureError::Conflict("record already exists".to_string()),
            Some("23503") => {
                return ProcedureError::Conflict("related record is missing".to_string())
            }
            Some("P0002") => return ProcedureError::NotFound("record not found".to_string()),
            _ => {}
        }
    }

    ProcedureError::Database(err)
}
