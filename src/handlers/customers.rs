//! Customer registration endpoints. Customers are the registry's core
//! records; sellers submit them from the field and back-office staff review
//! or reject them.

use std::time::Instant;

use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::auth::{Principal, Role};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::procedures::ProcedureParams;
use crate::state::AppState;
use crate::validation::{normalize, rules, sanitize, sanitize_str, FieldRules};

use super::support::{
    ensure_valid, field_value, first_row, json_body, optional_decimal, optional_int,
    optional_text, optional_uuid, parse_numeric_id,
};

#[derive(Debug, Deserialize)]
pub struct CustomerListQuery {
    pub status: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// POST /api/customers - register a customer
pub async fn customer_create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Option<Json<Value>>,
) -> ApiResult<Value> {
    let started = Instant::now();
    let payload = json_body(payload);

    ensure_valid(create_rules(&payload).validate())?;

    let params =
        customer_params(ProcedureParams::new(), &payload, &principal).arg("p_created_by", principal.id);

    let result = state.procedures().invoke("create_customer", params).await?;
    let customer = first_row(result, "customer")?;

    Ok(ApiResponse::created(customer)
        .caller(&principal)
        .meta("duration_ms", started.elapsed().as_millis() as u64))
}

/// GET /api/customers - list customers; sellers only ever see their own
pub async fn customer_list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<CustomerListQuery>,
) -> ApiResult<Value> {
    ensure_valid(list_rules(&query).validate())?;

    let seller_scope = if principal.role == Role::Seller {
        Some(principal.id)
    } else {
        None
    };

    let status = query
        .status
        .as_deref()
        .map(sanitize_str)
        .filter(|s| !s.is_empty());

    // Absent paging values go through as NULL; the procedure applies its
    // own defaults
    let params = ProcedureParams::new()
        .arg("p_status", status)
        .arg("p_limit", parse_int(&query.limit))
        .arg("p_offset", parse_int(&query.offset))
        .arg("p_seller_id", seller_scope);

    let result = state.procedures().invoke("list_customers", params).await?;
    let count = result.as_array().map(|rows| rows.len()).unwrap_or(0) as u64;

    Ok(ApiResponse::success(result).meta("count", count))
}

/// GET /api/customers/:id - show a single customer
pub async fn customer_show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_numeric_id(&id, "customer")?;

    let params = ProcedureParams::new().arg("p_customer_id", id);
    let result = state.procedures().invoke("get_customer", params).await?;
    let customer = first_row(result, "customer")?;

    Ok(ApiResponse::success(customer))
}

/// PUT /api/customers/:id - update customer fields; absent fields are left
/// untouched by the procedure
pub async fn customer_update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    payload: Option<Json<Value>>,
) -> ApiResult<Value> {
    let started = Instant::now();
    let id = parse_numeric_id(&id, "customer")?;
    let payload = json_body(payload);

    ensure_valid(update_rules(&payload).validate())?;

    let base = ProcedureParams::new().arg("p_customer_id", id);
    let params = customer_params(base, &payload, &principal).arg("p_updated_by", principal.id);

    let result = state.procedures().invoke("update_customer", params).await?;
    let customer = first_row(result, "customer")?;

    Ok(ApiResponse::success(customer)
        .caller(&principal)
        .meta("duration_ms", started.elapsed().as_millis() as u64))
}

/// POST /api/customers/:id/reject - back-office rejection with a reason
pub async fn customer_reject(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    payload: Option<Json<Value>>,
) -> ApiResult<Value> {
    let started = Instant::now();
    principal.require_backoffice()?;

    let id = parse_numeric_id(&id, "customer")?;
    let payload = json_body(payload);

    ensure_valid(
        FieldRules::new()
            .field(
                "reason",
                field_value(&payload, "reason"),
                vec![Box::new(rules::not_empty), Box::new(rules::max_length(500))],
                "is required and must be at most 500 characters",
            )
            .validate(),
    )?;

    let reason = sanitize(&field_value(&payload, "reason"));

    let params = ProcedureParams::new()
        .arg("p_customer_id", id)
        .arg("p_reason", reason)
        .arg("p_rejected_by", principal.id);

    let result = state.procedures().invoke("reject_customer", params).await?;
    let customer = first_row(result, "customer")?;

    Ok(ApiResponse::success(customer)
        .caller(&principal)
        .meta("duration_ms", started.elapsed().as_millis() as u64))
}

fn create_rules(payload: &Value) -> FieldRules {
    FieldRules::new()
        .field(
            "company_name",
            field_value(payload, "company_name"),
            vec![
                Box::new(rules::not_empty),
                Box::new(rules::min_length(3)),
                Box::new(rules::max_length(120)),
            ],
            "is required and must be 3 to 120 characters",
        )
        .field(
            "trade_name",
            field_value(payload, "trade_name"),
            vec![Box::new(rules::max_length(120))],
            "must be at most 120 characters",
        )
        .field(
            "document",
            field_value(payload, "document"),
            vec![Box::new(rules::not_empty), Box::new(rules::tax_document)],
            "must be a valid CPF or CNPJ",
        )
        .field(
            "email",
            field_value(payload, "email"),
            vec![Box::new(rules::not_empty), Box::new(rules::email)],
            "must be a valid email address",
        )
        .field(
            "phone",
            field_value(payload, "phone"),
            vec![Box::new(rules::max_length(20))],
            "must be at most 20 characters",
        )
        .field(
            "payment_condition_id",
            field_value(payload, "payment_condition_id"),
            vec![Box::new(rules::not_empty), Box::new(rules::positive_integer)],
            "is required and must be a positive integer",
        )
        .field(
            "credit_limit",
            field_value(payload, "credit_limit"),
            vec![Box::new(rules::optional(rules::positive_monetary))],
            "must be a positive amount",
        )
        .field(
            "group_network_id",
            field_value(payload, "group_network_id"),
            vec![Box::new(rules::optional(rules::positive_integer))],
            "must be a positive integer",
        )
        .field(
            "seller_id",
            field_value(payload, "seller_id"),
            vec![Box::new(rules::optional(rules::uuid))],
            "must be a valid uuid",
        )
}

// Same fields as create, every one optional
fn update_rules(payload: &Value) -> FieldRules {
    FieldRules::new()
        .field(
            "company_name",
            field_value(payload, "company_name"),
            vec![
                Box::new(rules::optional(rules::min_length(3))),
                Box::new(rules::max_length(120)),
            ],
            "must be 3 to 120 characters",
        )
        .field(
            "trade_name",
            field_value(payload, "trade_name"),
            vec![Box::new(rules::max_length(120))],
            "must be at most 120 characters",
        )
        .field(
            "document",
            field_value(payload, "document"),
            vec![Box::new(rules::optional(rules::tax_document))],
            "must be a valid CPF or CNPJ",
        )
        .field(
            "email",
            field_value(payload, "email"),
            vec![Box::new(rules::optional(rules::email))],
            "must be a valid email address",
        )
        .field(
            "phone",
            field_value(payload, "phone"),
            vec![Box::new(rules::max_length(20))],
            "must be at most 20 characters",
        )
        .field(
            "payment_condition_id",
            field_value(payload, "payment_condition_id"),
            vec![Box::new(rules::optional(rules::positive_integer))],
            "must be a positive integer",
        )
        .field(
            "credit_limit",
            field_value(payload, "credit_limit"),
            vec![Box::new(rules::optional(rules::positive_monetary))],
            "must be a positive amount",
        )
        .field(
            "group_network_id",
            field_value(payload, "group_network_id"),
            vec![Box::new(rules::optional(rules::positive_integer))],
            "must be a positive integer",
        )
        .field(
            "seller_id",
            field_value(payload, "seller_id"),
            vec![Box::new(rules::optional(rules::uuid))],
            "must be a valid uuid",
        )
}

fn list_rules(query: &CustomerListQuery) -> FieldRules {
    FieldRules::new()
        .field(
            "limit",
            query_value(&query.limit),
            vec![
                Box::new(rules::optional(rules::positive_integer)),
                Box::new(rules::optional(rules::range(1.0, 200.0))),
            ],
            "must be an integer between 1 and 200",
        )
        .field(
            "offset",
            query_value(&query.offset),
            vec![Box::new(rules::optional(rules::non_negative_integer))],
            "must be a non-negative integer",
        )
}

/// Shared field mapping for create and update. Sellers always submit under
/// their own id, whatever the payload says.
fn customer_params(base: ProcedureParams, payload: &Value, principal: &Principal) -> ProcedureParams {
    let seller_id = if principal.role == Role::Seller {
        Some(principal.id)
    } else {
        optional_uuid(payload, "seller_id")
    };

    let document = optional_text(payload, "document").map(|d| normalize(&d));
    let email = optional_text(payload, "email").map(|e| e.to_lowercase());

    base.arg("p_company_name", optional_text(payload, "company_name"))
        .arg("p_trade_name", optional_text(payload, "trade_name"))
        .arg("p_document", document)
        .arg("p_email", email)
        .arg("p_phone", optional_text(payload, "phone"))
        .arg("p_payment_condition_id", optional_int(payload, "payment_condition_id"))
        .arg("p_credit_limit", optional_decimal(payload, "credit_limit"))
        .arg("p_group_network_id", optional_int(payload, "group_network_id"))
        .arg("p_seller_id", seller_id)
}

fn query_value(field: &Option<String>) -> Value {
    field.clone().map(Value::String).unwrap_or(Value::Null)
}

fn parse_int(field: &Option<String>) -> Option<i64> {
    field.as_deref().and_then(|s| s.trim().parse().ok())
}
