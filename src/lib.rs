pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod procedures;
pub mod state;
pub mod validation;

use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::state::AppState;

/// Build the application router. Everything under `/api` sits behind the
/// authentication middleware; `/` and `/health` stay public.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(customer_routes())
        .merge(user_routes())
        .merge(seller_routes())
        .merge(group_network_routes())
        .merge(payment_condition_routes())
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::require_principal,
        ));

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Protected API
        .merge(protected)
        .fallback(unknown_route)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn customer_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::customers;

    Router::new()
        .route(
            "/api/customers",
            post(customers::customer_create).get(customers::customer_list),
        )
        .route(
            "/api/customers/:id",
            get(customers::customer_show).put(customers::customer_update),
        )
        .route(
            "/api/customers/:id/reject",
            post(customers::customer_reject),
        )
}

fn user_routes() -> Router<AppState> {
    use handlers::users;

    Router::new().route("/api/users/:id", get(users::user_show))
}

fn seller_routes() -> Router<AppState> {
    use handlers::sellers;

    Router::new().route("/api/sellers/:id", get(sellers::seller_show))
}

fn group_network_routes() -> Router<AppState> {
    use axum::routing::{post, put};
    use handlers::group_networks;

    Router::new()
        .route(
            "/api/group-networks",
            post(group_networks::group_network_create).get(group_networks::group_network_list),
        )
        .route(
            "/api/group-networks/:id",
            put(group_networks::group_network_update)
                .delete(group_networks::group_network_delete),
        )
}

fn payment_condition_routes() -> Router<AppState> {
    use handlers::payment_conditions;

    Router::new().route(
        "/api/payment-conditions",
        get(payment_conditions::payment_condition_list),
    )
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Partner Registry API",
            "version": version,
            "description": "Customer registration API for field sellers and back-office staff",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "customers": "/api/customers[/:id] (protected)",
                "customer_reject": "/api/customers/:id/reject (protected, backoffice)",
                "users": "/api/users/:id (protected)",
                "sellers": "/api/sellers/:id (protected)",
                "group_networks": "/api/group-networks[/:id] (protected, writes backoffice)",
                "payment_conditions": "/api/payment-conditions (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.procedures().health().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}

async fn unknown_route() -> ApiError {
    ApiError::not_found("route not found")
}
