use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

/// Stand-in for the managed identity provider. Rows are never removed;
/// account deletion flips `deleted` so the id stays reserved.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Identity {
    pub id: String, // user_67e5504410b1426f9247bb680e5fe0c8
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    pub fn new_user_id() -> String {
        format!("user_{}", Uuid::new_v4().simple())
    }

    pub async fn create(pool: &PgPool, id: &str, email: &str, password_hash: &str) -> Result<Self> {
        let identity = sqlx::query_as::<_, Identity>(
            r#"
            INSERT INTO identities (id, email, password_hash, deleted, created_at, updated_at)
            VALUES ($1, $2, $3, FALSE, $4, $5)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        debug!("Identity created: {}", identity.id);
        Ok(identity)
    }

    pub async fn get(pool: &PgPool, id: &str) -> Result<Option<Self>> {
        let identity = sqlx::query_as::<_, Identity>(
            r#"
            SELECT * FROM identities
            WHERE id = $1 AND deleted = FALSE
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(identity)
    }

    pub async fn get_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>> {
        let identity = sqlx::query_as::<_, Identity>(
            r#"
            SELECT * FROM identities
            WHERE email = $1 AND deleted = FALSE
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(identity)
    }

    pub async fn set_password_hash(pool: &PgPool, id: &str, password_hash: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE identities
            SET password_hash = $1, updated_at = $2
            WHERE id = $3 AND deleted = FALSE
            "#,
        )
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

        debug!("Password updated for identity: {}", id);
        Ok(result.rows_affected())
    }

    /// Marks the identity as deleted. The profile row is removed separately,
    /// before this runs.
    pub async fn mark_deleted(pool: &PgPool, id: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE identities
            SET deleted = TRUE, updated_at = $1
            WHERE id = $2
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

        info!("Identity marked deleted: {}", id);
        Ok(result.rows_affected())
    }
}
