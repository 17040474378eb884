use axum::extract::{Path, State};
use serde_json::Value;

use crate::middleware::response::{ApiResponse, ApiResult};
use crate::procedures::ProcedureParams;
use crate::state::AppState;

use super::support::{first_row, parse_uuid_id};

/// GET /api/sellers/:id - show a field seller
pub async fn seller_show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_uuid_id(&id, "seller")?;

    let params = ProcedureParams::new().arg("p_seller_id", id);
    let result = state.procedures().invoke("get_seller", params).await?;
    let seller = first_row(result, "seller")?;

    Ok(ApiResponse::success(seller))
}
