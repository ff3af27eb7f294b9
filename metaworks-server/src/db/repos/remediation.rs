//! Remediation tasks raised against assessment findings

use chrono::{DateTime, Utc};
use metaworks_core::Priority;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::DbError;
use crate::models::{TaskDraft, TaskStatus};

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemediationTask {
    pub id: i32,
    pub assessment_id: i32,
    pub control_id: i32,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    #[sqlx(try_from = "String")]
    pub priority: Priority,
    pub assigned_to: Option<String>,
    pub due_date: Option<String>,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const TASK_COLUMNS: &str = "id, assessment_id, control_id, title, description, status, \
    priority, assigned_to, due_date, external_id, created_at, updated_at";

pub struct RemediationRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> RemediationRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, assessment_id: i32) -> Result<Vec<RemediationTask>, DbError> {
        let tasks = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM remediation_tasks WHERE assessment_id = $1 ORDER BY id"
        ))
        .bind(assessment_id)
        .fetch_all(self.pool)
        .await?;
        Ok(tasks)
    }

    /// Save a task, keyed by (assessment, control, title).
    pub async fn upsert(
        &self,
        assessment_id: i32,
        draft: &TaskDraft,
    ) -> Result<RemediationTask, DbError> {
        let task = sqlx::query_as(&format!(
            r#"
            INSERT INTO remediation_tasks (
                assessment_id, control_id, title, description, status, priority,
                assigned_to, due_date, external_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (assessment_id, control_id, title) DO UPDATE SET
                description = EXCLUDED.description,
                status = EXCLUDED.status,
                priority = EXCLUDED.priority,
                assigned_to = EXCLUDED.assigned_to,
                due_date = EXCLUDED.due_date,
                external_id = EXCLUDED.external_id,
                updated_at = NOW()
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(assessment_id)
        .bind(draft.control_id)
        .bind(&draft.title)
        .bind(draft.description.as_deref())
        .bind(draft.status.as_str())
        .bind(draft.priority.as_str())
        .bind(draft.assigned_to.as_deref())
        .bind(draft.due_date.as_deref())
        .bind(draft.external_id.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            DbError::on_missing_parents(
                e,
                &[
                    ("control_id", "control", draft.control_id.to_string()),
                    ("assessment_id", "assessment", assessment_id.to_string()),
                ],
            )
        })?;
        Ok(task)
    }

    pub async fn update_status(
        &self,
        id: i32,
        status: TaskStatus,
    ) -> Result<RemediationTask, DbError> {
        sqlx::query_as(&format!(
            r#"
            UPDATE remediation_tasks SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("task", id))
    }
}
