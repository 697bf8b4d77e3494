use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Type};
use std::fmt;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;

/// Upload ceiling for resource files.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Document MIME types accepted for upload.
pub const ALLOWED_UPLOAD_TYPES: [&str; 8] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "text/plain",
];

pub fn validate_upload(content_type: &str, size: usize) -> Result<(), AppError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation(
            "File size must be less than 10MB".to_string(),
        ));
    }
    if !ALLOWED_UPLOAD_TYPES.contains(&content_type) {
        return Err(AppError::Validation(
            "Invalid file type. Please upload PDF, Word, Excel, PowerPoint, or text files."
                .to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone, Debug, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "resource_kind_enum", rename_all = "lowercase")] // SQL value name
#[serde(rename_all = "lowercase")] // JSON value name
pub enum ResourceKind {
    Document,
    Link,
    Folder,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Document => write!(f, "document"),
            ResourceKind::Link => write!(f, "link"),
            ResourceKind::Folder => write!(f, "folder"),
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Resource {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    /// External link, or the storage URL of an uploaded file.
    pub url: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Resource {
    fn default() -> Self {
        Resource {
            id: Uuid::new_v4(),
            user_id: String::new(),
            title: String::new(),
            description: String::new(),
            kind: ResourceKind::Document,
            url: None,
            file_type: None,
            file_size: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

impl Resource {
    pub async fn list(pool: &PgPool, user_id: &str) -> Result<Vec<Self>> {
        let resources = sqlx::query_as::<_, Resource>(
            r#"
            SELECT * FROM resources
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(resources)
    }

    pub async fn get(pool: &PgPool, resource_id: Uuid, user_id: &str) -> Result<Option<Self>> {
        let resource = sqlx::query_as::<_, Resource>(
            r#"
            SELECT * FROM resources
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(resource_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(resource)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        user_id: &str,
        title: &str,
        description: &str,
        kind: ResourceKind,
        url: Option<&str>,
        file_type: Option<&str>,
        file_size: Option<i64>,
    ) -> Result<Self> {
        let resource = Resource {
            user_id: user_id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            kind,
            url: url.map(str::to_string),
            file_type: file_type.map(str::to_string),
            file_size,
            ..Default::default()
        };

        let resource = sqlx::query_as::<_, Resource>(
            r#"
            INSERT INTO resources
                (id, user_id, title, description, kind, url, file_type, file_size, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(resource.id)
        .bind(&resource.user_id)
        .bind(&resource.title)
        .bind(&resource.description)
        .bind(resource.kind.clone())
        .bind(&resource.url)
        .bind(&resource.file_type)
        .bind(resource.file_size)
        .bind(resource.created_at)
        .bind(resource.updated_at)
        .fetch_one(pool)
        .await?;

        debug!("Resource created: {:?}", resource.id);
        Ok(resource)
    }

    /// Removes the row only. The storage object, when present, is deleted by
    /// the caller first so a failed blob delete leaves the row intact.
    pub async fn delete(pool: &PgPool, resource_id: Uuid, user_id: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM resources
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(resource_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        debug!("Resource deleted: {:?}", resource_id);
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_oversized_file() {
        assert!(validate_upload("application/pdf", 11 * 1024 * 1024).is_err());
    }

    #[test]
    fn accepts_file_under_limit() {
        assert!(validate_upload("application/pdf", 9 * 1024 * 1024).is_ok());
    }

    #[test]
    fn rejects_executable_mime_type() {
        assert!(validate_upload("application/x-msdownload", 1024).is_err());
    }

    #[test]
    fn accepts_every_allowed_document_type() {
        for mime in ALLOWED_UPLOAD_TYPES {
            assert!(validate_upload(mime, 1024).is_ok(), "{mime} should be accepted");
        }
    }
}
