// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::validation::ValidationReport;

/// HTTP API error with the kind assigned at the throw site. The kind alone
/// decides the status code and the `type` tag in the response body; nothing
/// downstream inspects message text.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation { message: String, details: Vec<String> },

    // 401 Unauthorized
    Authentication(String),

    // 403 Forbidden
    Authorization(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    Conflict(String),
    Database(String),
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation { .. } => 400,
            ApiError::Authentication(_) => 401,
            ApiError::Authorization(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 500,
            ApiError::Database(_) => 500,
            ApiError::Internal(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation { message, .. } => message,
            ApiError::Authentication(msg) => msg,
            ApiError::Authorization(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::Database(msg) => msg,
            ApiError::Internal(msg) => msg,
        }
    }

    /// Get error kind tag for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION",
            ApiError::Authentication(_) => "AUTHENTICATION",
            ApiError::Authorization(_) => "AUTHORIZATION",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Database(_) => "DATABASE",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.message(),
            "type": self.error_code(),
            "timestamp": Utc::now().to_rfc3339(),
        });

        if let ApiError::Validation { details, .. } = self {
            if !details.is_empty() {
                body["details"] = json!(details);
            }
        }

        body
    }
}

// Static constructor methods, one per kind
impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn validation_details(message: impl Into<String>, details: Vec<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        ApiError::Authentication(message.into())
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        ApiError::Authorization(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn database(message: impl Into<String>) -> Self {
        ApiError::Database(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

// Convert service-layer errors to ApiError
impl From<crate::auth::AuthRejection> for ApiError {
    fn from(err: crate::auth::AuthRejection) -> Self {
        ApiError::authentication(err.to_string())
    }
}

impl From<crate::procedures::ProcedureError> for ApiError {
    fn from(err: crate::procedures::ProcedureError) -> Self {
        match err {
            crate::procedures::ProcedureError::NotFound(msg) => ApiError::not_found(msg),
            crate::procedures::ProcedureError::Conflict(msg) => ApiError::conflict(msg),
            crate::procedures::ProcedureError::Database(err) => {
                // Log the real error but return generic message
                tracing::error!("Procedure call failed: {}", err);
                ApiError::database("database operation failed")
            }
            crate::procedures::ProcedureError::InvalidName(name) => {
                tracing::error!("Refused procedure name: {}", name);
                ApiError::internal("unexpected server error")
            }
        }
    }
}

impl From<ValidationReport> for ApiError {
    fn from(report: ValidationReport) -> Self {
        ApiError::Validation {
            message: "validation failed".to_string(),
            details: report.errors,
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
