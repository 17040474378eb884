#![allow(dead_code)]

//! In-process test harness: the real router with the identity provider,
//! user directory, and procedure gateway swapped for in-memory fakes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use partner_registry_api::auth::{
    AuthGate, DirectoryError, DirectoryUser, IdentityError, IdentityProvider, Role, UserDirectory,
    VerifiedIdentity,
};
use partner_registry_api::procedures::{
    ParamValue, ProcedureError, ProcedureGateway, ProcedureParams,
};
use partner_registry_api::state::AppState;

/// Token accepted by the fake identity provider and mapped to an active seller.
pub const SELLER_TOKEN: &str = "seller-token";
/// Token mapped to an active back-office user.
pub const BACKOFFICE_TOKEN: &str = "backoffice-token";
/// Token the provider accepts but whose subject has no local user record.
pub const GHOST_TOKEN: &str = "ghost-token";

pub struct TestApp {
    pub router: Router,
    pub seller_id: Uuid,
    pub backoffice_id: Uuid,
    pub gateway: Arc<RecordingGateway>,
    pub touches: Arc<Mutex<Vec<Uuid>>>,
}

pub fn test_app() -> TestApp {
    let seller_id = Uuid::new_v4();
    let backoffice_id = Uuid::new_v4();

    let seller_subject = Uuid::new_v4().to_string();
    let backoffice_subject = Uuid::new_v4().to_string();

    let mut subjects = HashMap::new();
    subjects.insert(SELLER_TOKEN.to_string(), seller_subject.clone());
    subjects.insert(BACKOFFICE_TOKEN.to_string(), backoffice_subject.clone());
    subjects.insert(GHOST_TOKEN.to_string(), Uuid::new_v4().to_string());

    let mut users = HashMap::new();
    users.insert(
        seller_subject,
        DirectoryUser {
            id: seller_id,
            email: "vendedor@empresa.com.br".to_string(),
            role: Role::Seller,
            active: true,
        },
    );
    users.insert(
        backoffice_subject,
        DirectoryUser {
            id: backoffice_id,
            email: "analista@empresa.com.br".to_string(),
            role: Role::Backoffice,
            active: true,
        },
    );

    let touches = Arc::new(Mutex::new(Vec::new()));
    let identity = MapIdentity { subjects };
    let directory = MapDirectory {
        users,
        touches: Arc::clone(&touches),
    };
    let gateway = Arc::new(RecordingGateway::new());

    let auth = AuthGate::new(Arc::new(identity), Arc::new(directory));
    let state = AppState::new(auth, gateway.clone());

    TestApp {
        router: partner_registry_api::app(state),
        seller_id,
        backoffice_id,
        gateway,
        touches,
    }
}

/// Dispatch a request against a fresh clone of the router and decode the
/// JSON body. An empty body decodes to `Value::Null`.
pub async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .router
        .clone()
        .oneshot(request)
        .await
        .expect("router call");
    read_json(response).await
}

pub fn request(method: &str, path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("request")
}

pub fn json_request(
    method: &str,
    path: &str,
    token: Option<&str>,
    payload: &Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(payload.to_string()))
        .expect("request")
}

/// Look up a recorded procedure parameter by name.
pub fn param(params: &ProcedureParams, name: &str) -> ParamValue {
    params
        .entries()
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.clone())
        .unwrap_or_else(|| panic!("missing parameter {}", name))
}

async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

struct MapIdentity {
    subjects: HashMap<String, String>,
}

#[async_trait]
impl IdentityProvider for MapIdentity {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        match self.subjects.get(token) {
            Some(subject) => Ok(VerifiedIdentity {
                subject: subject.clone(),
                email: None,
            }),
            None => Err(IdentityError::Rejected),
        }
    }
}

struct MapDirectory {
    users: HashMap<String, DirectoryUser>,
    touches: Arc<Mutex<Vec<Uuid>>>,
}

#[async_trait]
impl UserDirectory for MapDirectory {
    async fn lookup_active_user(
        &self,
        subject: &str,
    ) -> Result<Option<DirectoryUser>, DirectoryError> {
        Ok(self.users.get(subject).cloned())
    }

    async fn touch_last_seen(&self, user_id: Uuid) -> Result<(), DirectoryError> {
        self.touches.lock().unwrap().push(user_id);
        Ok(())
    }
}

#[derive(Clone)]
enum CannedResponse {
    Rows(Value),
    NotFound,
    Conflict,
    Database,
}

/// Procedure gateway fake. Records every call; unless told otherwise a
/// procedure answers with a single empty row.
pub struct RecordingGateway {
    calls: Mutex<Vec<(String, ProcedureParams)>>,
    responses: Mutex<HashMap<String, CannedResponse>>,
    healthy: AtomicBool,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(HashMap::new()),
            healthy: AtomicBool::new(true),
        }
    }

    pub fn respond_with(&self, procedure: &str, rows: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(procedure.to_string(), CannedResponse::Rows(rows));
    }

    pub fn fail_not_found(&self, procedure: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(procedure.to_string(), CannedResponse::NotFound);
    }

    pub fn fail_conflict(&self, procedure: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(procedure.to_string(), CannedResponse::Conflict);
    }

    pub fn fail_database(&self, procedure: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(procedure.to_string(), CannedResponse::Database);
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<(String, ProcedureParams)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ProcedureGateway for RecordingGateway {
    async fn invoke(
        &self,
        procedure: &str,
        params: ProcedureParams,
    ) -> Result<Value, ProcedureError> {
        self.calls
            .lock()
            .unwrap()
            .push((procedure.to_string(), params));

        let canned = self.responses.lock().unwrap().get(procedure).cloned();
        match canned {
            Some(CannedResponse::Rows(rows)) => Ok(rows),
            Some(CannedResponse::NotFound) => {
                Err(ProcedureError::NotFound("record not found".to_string()))
            }
            Some(CannedResponse::Conflict) => {
                Err(ProcedureError::Conflict("record already exists".to_string()))
            }
            Some(CannedResponse::Database) => {
                Err(ProcedureError::Database(sqlx::Error::PoolTimedOut))
            }
            None => Ok(json!([{}])),
        }
    }

    async fn health(&self) -> Result<(), ProcedureError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ProcedureError::Database(sqlx::Error::PoolTimedOut))
        }
    }
}
