use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::auth::Principal;

/// Wrapper for API responses that automatically adds the success envelope.
/// The envelope always carries a `meta.timestamp`; handlers may attach
/// extras such as the caller id or processing duration.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
    meta: Map<String, Value>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None, // Default to 200 OK
            meta: Map::new(),
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
            meta: Map::new(),
        }
    }

    /// Attach an extra meta entry to the envelope
    pub fn meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.meta.insert(key.to_string(), value.into());
        self
    }

    /// Record the caller's id in the envelope meta
    pub fn caller(self, principal: &Principal) -> Self {
        let id = principal.id.to_string();
        self.meta("caller", id)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        // Convert data to JSON Value for consistent envelope format
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "failed to serialize response data",
                        "type": "INTERNAL",
                        "timestamp": Utc::now().to_rfc3339(),
                    })),
                )
                    .into_response();
            }
        };

        let mut meta = self.meta;
        meta.insert("timestamp".to_string(), json!(Utc::now().to_rfc3339()));

        // Wrap in success envelope
        let envelope = json!({
            "success": true,
            "data": data_value,
            "meta": meta,
        });

        (status, Json(envelope)).into_response()
    }
}

/// Convenience alias: every handler returns this
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
