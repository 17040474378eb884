//! Group-network reference records: buying groups a customer can belong
//! to. Reads are open to any authenticated caller; writes are back-office
//! only.

use std::time::Instant;

use axum::extract::{Extension, Path, State};
use axum::Json;
use serde_json::Value;

use crate::auth::Principal;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::procedures::ProcedureParams;
use crate::state::AppState;
use crate::validation::{rules, sanitize, FieldRules};

use super::support::{
    ensure_valid, field_value, first_row, json_body, optional_text, parse_numeric_id,
};

/// GET /api/group-networks - list group networks
pub async fn group_network_list(State(state): State<AppState>) -> ApiResult<Value> {
    let result = state
        .procedures()
        .invoke("list_group_networks", ProcedureParams::new())
        .await?;
    let count = result.as_array().map(|rows| rows.len()).unwrap_or(0) as u64;

    Ok(ApiResponse::success(result).meta("count", count))
}

/// POST /api/group-networks - create a group network (back-office only)
pub async fn group_network_create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Option<Json<Value>>,
) -> ApiResult<Value> {
    let started = Instant::now();
    principal.require_backoffice()?;

    let payload = json_body(payload);
    ensure_valid(body_rules(&payload, true).validate())?;

    let params = ProcedureParams::new()
        .arg("p_name", sanitize(&field_value(&payload, "name")))
        .arg("p_description", optional_text(&payload, "description"))
        .arg("p_created_by", principal.id);

    let result = state.procedures().invoke("create_group_network", params).await?;
    let network = first_row(result, "group network")?;

    Ok(ApiResponse::created(network)
        .caller(&principal)
        .meta("duration_ms", started.elapsed().as_millis() as u64))
}

/// PUT /api/group-networks/:id - update a group network (back-office only)
pub async fn group_network_update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    payload: Option<Json<Value>>,
) -> ApiResult<Value> {
    let started = Instant::now();
    principal.require_backoffice()?;

    let id = parse_numeric_id(&id, "group network")?;
    let payload = json_body(payload);
    ensure_valid(body_rules(&payload, false).validate())?;

    let params = ProcedureParams::new()
        .arg("p_group_network_id", id)
        .arg("p_name", optional_text(&payload, "name"))
        .arg("p_description", optional_text(&payload, "description"))
        .arg("p_updated_by", principal.id);

    let result = state.procedures().invoke("update_group_network", params).await?;
    let network = first_row(result, "group network")?;

    Ok(ApiResponse::success(network)
        .caller(&principal)
        .meta("duration_ms", started.elapsed().as_millis() as u64))
}

/// DELETE /api/group-networks/:id - remove a group network (back-office
/// only)
pub async fn group_network_delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let started = Instant::now();
    principal.require_backoffice()?;

    let id = parse_numeric_id(&id, "group network")?;

    let params = ProcedureParams::new()
        .arg("p_group_network_id", id)
        .arg("p_deleted_by", principal.id);

    let result = state.procedures().invoke("delete_group_network", params).await?;
    let network = first_row(result, "group network")?;

    Ok(ApiResponse::success(network)
        .caller(&principal)
        .meta("duration_ms", started.elapsed().as_millis() as u64))
}

fn body_rules(payload: &Value, name_required: bool) -> FieldRules {
    let (name_checks, name_message): (Vec<crate::validation::Check>, &str) = if name_required {
        (
            vec![Box::new(rules::not_empty), Box::new(rules::max_length(80))],
            "is required and must be at most 80 characters",
        )
    } else {
        (
            vec![Box::new(rules::max_length(80))],
            "must be at most 80 characters",
        )
    };

    FieldRules::new()
        .field(
            "name",
            field_value(payload, "name"),
            name_checks,
            name_message,
        )
        .field(
            "description",
            field_value(payload, "description"),
            vec![Box::new(rules::max_length(255))],
            "must be at most 255 characters",
        )
}
