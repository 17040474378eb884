mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};

use partner_registry_api::procedures::ParamValue;

fn valid_customer() -> Value {
    json!({
        "company_name": "Mercado Bom Preço Ltda",
        "trade_name": "Bom Preço",
        "document": "11.222.333/0001-81",
        "email": "Compras@BomPreco.com.br",
        "phone": "+55 11 99999-0000",
        "payment_condition_id": 3,
        "credit_limit": "5000.00",
    })
}

#[tokio::test]
async fn create_returns_created_with_caller_meta() -> Result<()> {
    let app = common::test_app();
    app.gateway.respond_with(
        "create_customer",
        json!([{ "id": 7, "company_name": "Mercado Bom Preço Ltda", "status": "pending" }]),
    );

    let (status, body) = common::send(
        &app,
        common::json_request(
            "POST",
            "/api/customers",
            Some(common::BACKOFFICE_TOKEN),
            &valid_customer(),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], 7);
    assert_eq!(body["meta"]["caller"], app.backoffice_id.to_string());
    assert!(body["meta"]["timestamp"].is_string());
    assert!(body["meta"]["duration_ms"].is_number());

    let calls = app.gateway.calls();
    assert_eq!(calls.len(), 1);
    let (name, params) = &calls[0];
    assert_eq!(name, "create_customer");
    // Document arrives stripped of its mask, email lowercased
    assert_eq!(
        common::param(params, "p_document"),
        ParamValue::Text("11222333000181".to_string())
    );
    assert_eq!(
        common::param(params, "p_email"),
        ParamValue::Text("compras@bompreco.com.br".to_string())
    );
    assert_eq!(
        common::param(params, "p_created_by"),
        ParamValue::Text(app.backoffice_id.to_string())
    );
    // No seller was submitted and the caller is back-office
    assert_eq!(common::param(params, "p_seller_id"), ParamValue::Null);

    Ok(())
}

#[tokio::test]
async fn create_rejects_invalid_payload_with_ordered_details() -> Result<()> {
    let app = common::test_app();

    let payload = json!({
        "company_name": "AB",
        "document": "123",
    });

    let (status, body) = common::send(
        &app,
        common::json_request(
            "POST",
            "/api/customers",
            Some(common::SELLER_TOKEN),
            &payload,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "validation failed");
    assert_eq!(body["type"], "VALIDATION");
    assert_eq!(
        body["details"],
        json!([
            "company_name: is required and must be 3 to 120 characters",
            "document: must be a valid CPF or CNPJ",
            "email: must be a valid email address",
            "payment_condition_id: is required and must be a positive integer",
        ])
    );
    assert_eq!(app.gateway.call_count(), 0);

    Ok(())
}

#[tokio::test]
async fn create_without_body_is_a_validation_error() -> Result<()> {
    let app = common::test_app();

    let (status, body) = common::send(
        &app,
        common::request("POST", "/api/customers", Some(common::BACKOFFICE_TOKEN)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["type"], "VALIDATION");
    let details = body["details"].as_array().cloned().unwrap_or_default();
    assert_eq!(details.len(), 4);
    assert!(details[0].as_str().unwrap_or("").starts_with("company_name:"));
    assert_eq!(app.gateway.call_count(), 0);

    Ok(())
}

#[tokio::test]
async fn seller_create_is_forced_to_own_seller_id() -> Result<()> {
    let app = common::test_app();

    let mut payload = valid_customer();
    payload["seller_id"] = json!("6f9619ff-8b86-d011-b42d-00c04fc964ff");

    let (status, _body) = common::send(
        &app,
        common::json_request(
            "POST",
            "/api/customers",
            Some(common::SELLER_TOKEN),
            &payload,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let calls = app.gateway.calls();
    let (_, params) = &calls[0];
    assert_eq!(
        common::param(params, "p_seller_id"),
        ParamValue::Text(app.seller_id.to_string()),
        "sellers always register under their own id"
    );

    Ok(())
}

#[tokio::test]
async fn show_rejects_non_numeric_id_before_calling_the_database() -> Result<()> {
    let app = common::test_app();

    let (status, body) = common::send(
        &app,
        common::request("GET", "/api/customers/abc", Some(common::SELLER_TOKEN)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "customer id must be numeric");
    assert_eq!(body["type"], "VALIDATION");
    assert_eq!(app.gateway.call_count(), 0);

    Ok(())
}

#[tokio::test]
async fn show_maps_empty_result_to_not_found() -> Result<()> {
    let app = common::test_app();
    app.gateway.respond_with("get_customer", json!([]));

    let (status, body) = common::send(
        &app,
        common::request("GET", "/api/customers/42", Some(common::SELLER_TOKEN)),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "customer not found");
    assert_eq!(body["type"], "NOT_FOUND");

    Ok(())
}

#[tokio::test]
async fn update_accepts_a_partial_payload() -> Result<()> {
    let app = common::test_app();

    let payload = json!({ "phone": "+55 11 98888-7777" });

    let (status, body) = common::send(
        &app,
        common::json_request(
            "PUT",
            "/api/customers/42",
            Some(common::BACKOFFICE_TOKEN),
            &payload,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let calls = app.gateway.calls();
    let (name, params) = &calls[0];
    assert_eq!(name, "update_customer");
    assert_eq!(common::param(params, "p_customer_id"), ParamValue::Int(42));
    assert_eq!(
        common::param(params, "p_phone"),
        ParamValue::Text("+55 11 98888-7777".to_string())
    );
    // Untouched fields go through as NULL so the procedure leaves them alone
    assert_eq!(common::param(params, "p_company_name"), ParamValue::Null);

    Ok(())
}

#[tokio::test]
async fn reject_requires_backoffice() -> Result<()> {
    let app = common::test_app();

    let (status, body) = common::send(
        &app,
        common::json_request(
            "POST",
            "/api/customers/42/reject",
            Some(common::SELLER_TOKEN),
            &json!({ "reason": "documentação inválida" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "insufficient permissions for this operation");
    assert_eq!(body["type"], "AUTHORIZATION");
    assert_eq!(app.gateway.call_count(), 0);

    Ok(())
}

#[tokio::test]
async fn reject_requires_a_reason() -> Result<()> {
    let app = common::test_app();

    let (status, body) = common::send(
        &app,
        common::json_request(
            "POST",
            "/api/customers/42/reject",
            Some(common::BACKOFFICE_TOKEN),
            &json!({}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["details"],
        json!(["reason: is required and must be at most 500 characters"])
    );

    Ok(())
}

#[tokio::test]
async fn reject_records_reason_and_rejector() -> Result<()> {
    let app = common::test_app();

    let (status, _body) = common::send(
        &app,
        common::json_request(
            "POST",
            "/api/customers/42/reject",
            Some(common::BACKOFFICE_TOKEN),
            &json!({ "reason": "  documentação inválida  " }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let calls = app.gateway.calls();
    let (name, params) = &calls[0];
    assert_eq!(name, "reject_customer");
    assert_eq!(common::param(params, "p_customer_id"), ParamValue::Int(42));
    assert_eq!(
        common::param(params, "p_reason"),
        ParamValue::Text("documentação inválida".to_string())
    );
    assert_eq!(
        common::param(params, "p_rejected_by"),
        ParamValue::Text(app.backoffice_id.to_string())
    );

    Ok(())
}

#[tokio::test]
async fn list_validates_paging_bounds() -> Result<()> {
    let app = common::test_app();

    let (status, body) = common::send(
        &app,
        common::request(
            "GET",
            "/api/customers?limit=500",
            Some(common::SELLER_TOKEN),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["details"],
        json!(["limit: must be an integer between 1 and 200"])
    );
    assert_eq!(app.gateway.call_count(), 0);

    Ok(())
}

#[tokio::test]
async fn list_scopes_sellers_to_their_own_customers() -> Result<()> {
    let app = common::test_app();
    app.gateway.respond_with(
        "list_customers",
        json!([{ "id": 1, "status": "pending" }, { "id": 2, "status": "pending" }]),
    );

    let (status, body) = common::send(
        &app,
        common::request(
            "GET",
            "/api/customers?status=pending",
            Some(common::SELLER_TOKEN),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], 2);

    let calls = app.gateway.calls();
    let (name, params) = &calls[0];
    assert_eq!(name, "list_customers");
    assert_eq!(
        common::param(params, "p_status"),
        ParamValue::Text("pending".to_string())
    );
    assert_eq!(
        common::param(params, "p_seller_id"),
        ParamValue::Text(app.seller_id.to_string())
    );

    Ok(())
}

#[tokio::test]
async fn backoffice_list_is_unscoped() -> Result<()> {
    let app = common::test_app();

    let (status, _body) = common::send(
        &app,
        common::request("GET", "/api/customers", Some(common::BACKOFFICE_TOKEN)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let calls = app.gateway.calls();
    let (_, params) = &calls[0];
    assert_eq!(common::param(params, "p_seller_id"), ParamValue::Null);
    assert_eq!(common::param(params, "p_limit"), ParamValue::Null);
    assert_eq!(common::param(params, "p_offset"), ParamValue::Null);

    Ok(())
}

#[tokio::test]
async fn delete_method_is_not_allowed() -> Result<()> {
    let app = common::test_app();

    let (status, _body) = common::send(
        &app,
        common::request("DELETE", "/api/customers/42", Some(common::SELLER_TOKEN)),
    )
    .await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    Ok(())
}

#[tokio::test]
async fn duplicate_document_surfaces_as_conflict() -> Result<()> {
    let app = common::test_app();
    app.gateway.fail_conflict("create_customer");

    let (status, body) = common::send(
        &app,
        common::json_request(
            "POST",
            "/api/customers",
            Some(common::BACKOFFICE_TOKEN),
            &valid_customer(),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "record already exists");
    assert_eq!(body["type"], "CONFLICT");

    Ok(())
}

#[tokio::test]
async fn database_failure_is_opaque_to_the_client() -> Result<()> {
    let app = common::test_app();
    app.gateway.fail_database("get_customer");

    let (status, body) = common::send(
        &app,
        common::request("GET", "/api/customers/42", Some(common::SELLER_TOKEN)),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "database operation failed");
    assert_eq!(body["type"], "DATABASE");

    Ok(())
}
