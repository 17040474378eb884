use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::Role;

/// Local user record as stored in the registry database.
#[derive(Debug, Clone)]
pub struct DirectoryUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub active: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Unknown role value: {0}")]
    UnknownRole(String),
}

/// Local user store: resolves verified subjects to active users and records
/// last-seen timestamps.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn lookup_active_user(
        &self,
        subject: &str,
    ) -> Result<Option<DirectoryUser>, DirectoryError>;

    async fn touch_last_seen(&self, user_id: Uuid) -> Result<(), DirectoryError>;
}

/// Users table in the registry database, keyed by the identity provider's
/// subject id.
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn lookup_active_user(
        &self,
        subject: &str,
    ) -> Result<Option<DirectoryUser>, DirectoryError> {
        // Subjects that are not UUIDs cannot match any row
        let Ok(auth_user_id) = Uuid::parse_str(subject) else {
            return Ok(None);
        };

        let row = sqlx::query(
            r#"
            SELECT id, email, role, active
            FROM users
            WHERE auth_user_id = $1
            AND active = true
            AND deleted_at IS NULL
            "#,
        )
        .bind(auth_user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let role_value: String = row.try_get("role")?;
        let role = Role::parse(&role_value).ok_or(DirectoryError::UnknownRole(role_value))?;

        Ok(Some(DirectoryUser {
            id: row.try_get("id")?,
            email: row
                .try_get::<Option<String>, _>("email")?
                .unwrap_or_default(),
            role,
            active: row.try_get("active")?,
        }))
    }

    async fn touch_last_seen(&self, user_id: Uuid) -> Result<(), DirectoryError> {
        sqlx::query("UPDATE users SET last_seen_at = now() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
