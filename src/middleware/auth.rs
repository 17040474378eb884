use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Authentication middleware for the protected route group. Runs the auth
/// gate once per request and injects the resulting [`Principal`] into the
/// request extensions; handlers read it back via `Extension`.
///
/// [`Principal`]: crate::auth::Principal
pub async fn require_principal(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = state
        .auth()
        .authenticate(request.headers())
        .await
        .map_err(|rejection| {
            tracing::warn!(
                "Authentication rejected for {} {}: {}",
                request.method(),
                request.uri().path(),
                rejection
            );
            ApiError::from(rejection)
        })?;

    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}
