//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::AuthGate;
use crate::procedures::ProcedureGateway;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the authentication gate and the
/// stored-procedure gateway every endpoint delegates to.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    auth: AuthGate,
    procedures: Arc<dyn ProcedureGateway>,
}

impl AppState {
    pub fn new(auth: AuthGate, procedures: Arc<dyn ProcedureGateway>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { auth, procedures }),
        }
    }

    pub fn auth(&self) -> &AuthGate {
        &self.inner.auth
    }

    pub fn procedures(&self) -> &dyn ProcedureGateway {
        self.inner.procedures.as_ref()
    }
}
