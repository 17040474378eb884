use axum::extract::{Path, State};
use serde_json::Value;

use crate::middleware::response::{ApiResponse, ApiResult};
use crate::procedures::ProcedureParams;
use crate::state::AppState;

use super::support::{first_row, parse_uuid_id};

/// GET /api/users/:id - show a registry user
pub async fn user_show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_uuid_id(&id, "user")?;

    let params = ProcedureParams::new().arg("p_user_id", id);
    let result = state.procedures().invoke("get_user", params).await?;
    let user = first_row(result, "user")?;

    Ok(ApiResponse::success(user))
}
