//! Uploaded file metadata. Bytes live under the configured upload dir.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::DbError;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub id: i32,
    pub original_name: String,
    pub stored_name: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub uploaded_by: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl StoredFile {
    /// Public path served by the static file route.
    pub fn url(&self) -> String {
        format!("/uploads/{}", self.stored_name)
    }
}

pub struct FileRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> FileRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        original_name: &str,
        stored_name: &str,
        content_type: Option<&str>,
        size_bytes: i64,
        uploaded_by: i32,
    ) -> Result<StoredFile, DbError> {
        let file = sqlx::query_as(
            r#"
            INSERT INTO files (original_name, stored_name, content_type, size_bytes, uploaded_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, original_name, stored_name, content_type, size_bytes, uploaded_by, created_at
            "#,
        )
        .bind(original_name)
        .bind(stored_name)
        .bind(content_type)
        .bind(size_bytes)
        .bind(uploaded_by)
        .fetch_one(self.pool)
        .await?;
        Ok(file)
    }

    pub async fn get(&self, id: i32) -> Result<StoredFile, DbError> {
        sqlx::query_as(
            r#"
            SELECT id, original_name, stored_name, content_type, size_bytes, uploaded_by, created_at
            FROM files WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("file", id))
    }
}
