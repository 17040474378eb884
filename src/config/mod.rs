use serde::{Deserialize, Serialize};
use std::env;

/// Runtime configuration, built once in `main` and handed to the gateway
/// constructors. There is no global config state; anything that needs a
/// setting receives it explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub identity: IdentityConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Base URL of the hosted identity provider (token verification endpoint
    /// lives under it).
    pub base_url: String,
    /// Service key sent alongside the end-user bearer token.
    pub service_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::defaults().with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // HTTP overrides (PARTNER_API_PORT wins over the generic PORT)
        if let Ok(v) = env::var("PARTNER_API_PORT").or_else(|_| env::var("PORT")) {
            self.http.port = v.parse().unwrap_or(self.http.port);
        }

        // Identity provider overrides
        if let Ok(v) = env::var("IDENTITY_BASE_URL") {
            self.identity.base_url = v;
        }
        if let Ok(v) = env::var("IDENTITY_SERVICE_KEY") {
            self.identity.service_key = v;
        }
        if let Ok(v) = env::var("IDENTITY_TIMEOUT_SECS") {
            self.identity.timeout_secs = v.parse().unwrap_or(self.identity.timeout_secs);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs =
                v.parse().unwrap_or(self.database.acquire_timeout_secs);
        }

        self
    }

    fn defaults() -> Self {
        Self {
            http: HttpConfig { port: 3000 },
            identity: IdentityConfig {
                base_url: "http://localhost:9999".to_string(),
                service_key: String::new(),
                timeout_secs: 10,
            },
            database: DatabaseConfig {
                url: "postgres://localhost:5432/partner_registry".to_string(),
                max_connections: 10,
                acquire_timeout_secs: 30,
            },
        }
    }
}
