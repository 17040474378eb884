use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::config::IdentityConfig;

/// Identity asserted by the remote provider for a verified token.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub subject: String,
    pub email: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Token rejected by identity provider")]
    Rejected,
    #[error("Identity provider unreachable: {0}")]
    Upstream(String),
    #[error("Identity provider response malformed: {0}")]
    Malformed(String),
}

/// Remote token verification boundary.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError>;
}

/// Verifies bearer tokens against the hosted identity service's user
/// endpoint. The end-user token travels as the bearer credential; the
/// service key rides along in the provider's `apikey` header.
pub struct HttpIdentityProvider {
    client: Client,
    user_endpoint: Url,
    service_key: String,
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl HttpIdentityProvider {
    pub fn new(config: &IdentityConfig) -> anyhow::Result<Self> {
        let base = Url::parse(&config.base_url)?;
        let user_endpoint = base.join("auth/v1/user")?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            user_endpoint,
            service_key: config.service_key.clone(),
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let response = self
            .client
            .get(self.user_endpoint.clone())
            .bearer_auth(token)
            .header("apikey", &self.service_key)
            .send()
            .await
            .map_err(|e| IdentityError::Upstream(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let user: ProviderUser = response
                .json()
                .await
                .map_err(|e| IdentityError::Malformed(e.to_string()))?;
            return Ok(VerifiedIdentity {
                subject: user.id,
                email: user.email,
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            Err(IdentityError::Rejected)
        } else {
            Err(IdentityError::Upstream(format!("unexpected status {}", status)))
        }
    }
}
