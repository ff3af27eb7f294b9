//! Policy documents

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::DbError;
use crate::models::PolicyDraft;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: i32,
    pub title: String,
    #[serde(rename = "type")]
    pub policy_type: String,
    pub content: Option<String>,
    pub file_id: Option<i32>,
    pub version: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const POLICY_COLUMNS: &str =
    "id, title, policy_type, content, file_id, version, created_at, updated_at";

pub struct PolicyRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PolicyRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Policy>, DbError> {
        let policies = sqlx::query_as(&format!(
            "SELECT {POLICY_COLUMNS} FROM policies ORDER BY updated_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(policies)
    }

    pub async fn get(&self, id: i32) -> Result<Policy, DbError> {
        sqlx::query_as(&format!("SELECT {POLICY_COLUMNS} FROM policies WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("policy", id))
    }

    /// Insert, or update when the draft carries an id.
    pub async fn save(&self, draft: &PolicyDraft) -> Result<Policy, DbError> {
        match draft.id {
            Some(id) => sqlx::query_as(&format!(
                r#"
                UPDATE policies SET
                    title = $2, policy_type = $3, content = $4, file_id = $5,
                    version = $6, updated_at = NOW()
                WHERE id = $1
                RETURNING {POLICY_COLUMNS}
                "#
            ))
            .bind(id)
            .bind(&draft.title)
            .bind(&draft.policy_type)
            .bind(draft.content.as_deref())
            .bind(draft.file_id)
            .bind(draft.version.as_deref())
            .fetch_optional(self.pool)
            .await
            .map_err(|e| DbError::on_missing_parent(e, "file", draft.file_id.unwrap_or_default()))?
            .ok_or_else(|| DbError::not_found("policy", id)),
            None => {
                let policy = sqlx::query_as(&format!(
                    r#"
                    INSERT INTO policies (title, policy_type, content, file_id, version)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING {POLICY_COLUMNS}
                    "#
                ))
                .bind(&draft.title)
                .bind(&draft.policy_type)
                .bind(draft.content.as_deref())
                .bind(draft.file_id)
                .bind(draft.version.as_deref())
                .fetch_one(self.pool)
                .await
                .map_err(|e| {
                    DbError::on_missing_parent(e, "file", draft.file_id.unwrap_or_default())
                })?;
                Ok(policy)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires database"]
    async fn unknown_file_is_not_found() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();

        let draft = PolicyDraft {
            id: None,
            title: "Access Control".into(),
            policy_type: "isms".into(),
            content: None,
            file_id: Some(999_999),
            version: None,
        };
        let err = PolicyRepo::new(&pool).save(&draft).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "file", .. }));
    }
}
