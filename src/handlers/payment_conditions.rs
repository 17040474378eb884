use axum::extract::State;
use serde_json::Value;

use crate::middleware::response::{ApiResponse, ApiResult};
use crate::procedures::ProcedureParams;
use crate::state::AppState;

/// GET /api/payment-conditions - reference list of payment terms
pub async fn payment_condition_list(State(state): State<AppState>) -> ApiResult<Value> {
    let result = state
        .procedures()
        .invoke("list_payment_conditions", ProcedureParams::new())
        .await?;
    let count = result.as_array().map(|rows| rows.len()).unwrap_or(0) as u64;

    Ok(ApiResponse::success(result).meta("count", count))
}
