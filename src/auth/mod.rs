//! Request authentication: bearer credential verification against the
//! remote identity provider, resolution against the local user directory,
//! and the resulting [`Principal`] handlers authorize on.

pub mod directory;
pub mod identity;

pub use directory::{DirectoryError, DirectoryUser, PgUserDirectory, UserDirectory};
pub use identity::{HttpIdentityProvider, IdentityError, IdentityProvider, VerifiedIdentity};

use axum::http::{header::AUTHORIZATION, HeaderMap};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Backoffice,
    Seller,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "backoffice" => Some(Role::Backoffice),
            "seller" => Some(Role::Seller),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Backoffice => "backoffice",
            Role::Seller => "seller",
        }
    }
}

/// Authenticated caller attached to a request after the gate accepts it.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub active: bool,
}

impl Principal {
    pub fn is_backoffice(&self) -> bool {
        self.role == Role::Backoffice
    }

    /// Role gate for back-office-only operations. Distinct from
    /// authentication failure: the caller is known, just not allowed.
    pub fn require_backoffice(&self) -> Result<(), ApiError> {
        if self.is_backoffice() {
            Ok(())
        } else {
            Err(ApiError::authorization(
                "insufficient permissions for this operation",
            ))
        }
    }
}

/// Why a request was turned away. The Display text is the exact message
/// returned to the client.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthRejection {
    #[error("missing authorization header")]
    MissingHeader,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("user not found or inactive")]
    UnknownUser,
}

/// Verifies the bearer credential with the identity provider, then resolves
/// the subject against the local user directory.
#[derive(Clone)]
pub struct AuthGate {
    identity: Arc<dyn IdentityProvider>,
    directory: Arc<dyn UserDirectory>,
}

impl AuthGate {
    pub fn new(identity: Arc<dyn IdentityProvider>, directory: Arc<dyn UserDirectory>) -> Self {
        Self { identity, directory }
    }

    /// Authenticate a request from its headers.
    ///
    /// A token that verifies but maps to no active local user is rejected
    /// with the same message as an unknown user; directory failures collapse
    /// into that rejection as well, with the detail logged.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, AuthRejection> {
        let token = bearer_token(headers)?;

        let verified = match self.identity.verify(&token).await {
            Ok(identity) => identity,
            Err(err) => {
                tracing::warn!("Token verification failed: {}", err);
                return Err(AuthRejection::InvalidToken);
            }
        };

        let user = match self.directory.lookup_active_user(&verified.subject).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err(AuthRejection::UnknownUser),
            Err(err) => {
                tracing::warn!("User lookup failed for subject {}: {}", verified.subject, err);
                return Err(AuthRejection::UnknownUser);
            }
        };

        let email = if user.email.trim().is_empty() {
            verified.email.unwrap_or(user.email)
        } else {
            user.email
        };

        let principal = Principal {
            id: user.id,
            email,
            role: user.role,
            active: user.active,
        };

        self.touch_last_seen(principal.id);

        Ok(principal)
    }

    /// Best-effort last-seen update, dispatched on its own task. A failure
    /// here is logged and never joins the authentication result.
    fn touch_last_seen(&self, user_id: Uuid) {
        let directory = Arc::clone(&self.directory);
        tokio::spawn(async move {
            if let Err(err) = directory.touch_last_seen(user_id).await {
                tracing::warn!("Last-seen update failed for user {}: {}", user_id, err);
            }
        });
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<String, AuthRejection> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthRejection::MissingHeader)?;

    let value = header.to_str().map_err(|_| AuthRejection::InvalidToken)?;
    // The Bearer prefix is optional; a bare token is accepted as-is
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();

    if token.is_empty() {
        return Err(AuthRejection::InvalidToken);
    }

    Ok(token.to_string())
}
