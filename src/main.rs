use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

use partner_registry_api::auth::{AuthGate, HttpIdentityProvider, PgUserDirectory};
use partner_registry_api::config::AppConfig;
use partner_registry_api::procedures::PgProcedureGateway;
use partner_registry_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, IDENTITY_BASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect_lazy(&config.database.url)?;

    let identity = HttpIdentityProvider::new(&config.identity)?;
    let directory = PgUserDirectory::new(pool.clone());
    let auth = AuthGate::new(Arc::new(identity), Arc::new(directory));
    let procedures = Arc::new(PgProcedureGateway::new(pool));

    let state = AppState::new(auth, procedures);
    let app = partner_registry_api::app(state);

    let bind_addr = format!("0.0.0.0:{}", config.http.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Partner registry API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
