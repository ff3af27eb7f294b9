//! Assessments, their per-control results, and the report join

use chrono::{DateTime, Utc};
use metaworks_core::{AssessmentEntry, ControlStatus, Priority};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::DbError;
use crate::models::{AssessmentStatus, NewAssessment, ResultDraft, StatusUpdate};

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: i32,
    pub company_id: Option<i32>,
    pub framework_id: i32,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub status: AssessmentStatus,
    pub score: Option<i32>,
    pub start_date: DateTime<Utc>,
    pub completion_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub id: i32,
    pub assessment_id: i32,
    pub control_id: i32,
    #[sqlx(try_from = "String")]
    pub status: ControlStatus,
    #[sqlx(try_from = "String")]
    pub priority: Priority,
    pub evidence: Option<String>,
    pub comments: Option<String>,
    pub recommendation: Option<String>,
    pub management_response: Option<String>,
    pub target_date: Option<String>,
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// One result joined with its control and domain.
#[derive(Debug, FromRow)]
struct EntryRow {
    domain: String,
    sort_order: i32,
    control_code: String,
    control_name: String,
    #[sqlx(try_from = "String")]
    status: ControlStatus,
    comments: Option<String>,
    recommendation: Option<String>,
    management_response: Option<String>,
    target_date: Option<String>,
    #[sqlx(try_from = "String")]
    priority: Priority,
}

impl From<EntryRow> for AssessmentEntry {
    fn from(row: EntryRow) -> Self {
        Self {
            domain: row.domain,
            subdomain: String::new(),
            domain_code: row.sort_order.to_string(),
            control_code: row.control_code,
            control_name: row.control_name,
            status: row.status,
            current_status: row.comments.unwrap_or_default(),
            recommendation: row.recommendation.unwrap_or_default(),
            management_response: row.management_response.unwrap_or_default(),
            target_date: row.target_date.unwrap_or_default(),
            priority: row.priority,
        }
    }
}

const ASSESSMENT_COLUMNS: &str = "id, company_id, framework_id, name, status, score, \
    start_date, completion_date, created_at, updated_at";
const RESULT_COLUMNS: &str = "id, assessment_id, control_id, status, priority, evidence, \
    comments, recommendation, management_response, target_date, updated_by, updated_at";

pub struct AssessmentRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> AssessmentRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, company_id: Option<i32>) -> Result<Vec<Assessment>, DbError> {
        let assessments = sqlx::query_as(&format!(
            r#"
            SELECT {ASSESSMENT_COLUMNS} FROM assessments
            WHERE $1::int IS NULL OR company_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(company_id)
        .fetch_all(self.pool)
        .await?;
        Ok(assessments)
    }

    pub async fn get(&self, id: i32) -> Result<Assessment, DbError> {
        sqlx::query_as(&format!("SELECT {ASSESSMENT_COLUMNS} FROM assessments WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("assessment", id))
    }

    pub async fn create(&self, new: &NewAssessment) -> Result<Assessment, DbError> {
        let assessment = sqlx::query_as(&format!(
            r#"
            INSERT INTO assessments (company_id, framework_id, name, status, start_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ASSESSMENT_COLUMNS}
            "#
        ))
        .bind(new.company_id)
        .bind(new.framework_id)
        .bind(&new.name)
        .bind(AssessmentStatus::Draft.as_str())
        .bind(new.start_date)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            DbError::on_missing_parents(
                e,
                &[
                    ("framework_id", "framework", new.framework_id.to_string()),
                    ("company_id", "company", new.company_id.unwrap_or_default().to_string()),
                ],
            )
        })?;
        Ok(assessment)
    }

    /// Move to a new status. Completion stamps `completion_date`; a `None`
    /// score keeps the stored one.
    pub async fn update_status(
        &self,
        id: i32,
        update: &StatusUpdate,
    ) -> Result<Assessment, DbError> {
        sqlx::query_as(&format!(
            r#"
            UPDATE assessments SET
                status = $2,
                score = COALESCE($3, score),
                completion_date = CASE WHEN $2 = 'completed' THEN NOW() ELSE completion_date END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ASSESSMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.status.as_str())
        .bind(update.score)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("assessment", id))
    }

    pub async fn list_results(&self, assessment_id: i32) -> Result<Vec<AssessmentResult>, DbError> {
        self.get(assessment_id).await?;
        let results = sqlx::query_as(&format!(
            "SELECT {RESULT_COLUMNS} FROM assessment_results WHERE assessment_id = $1 ORDER BY control_id"
        ))
        .bind(assessment_id)
        .fetch_all(self.pool)
        .await?;
        Ok(results)
    }

    /// Record the result for one control, replacing any earlier one.
    pub async fn upsert_result(
        &self,
        assessment_id: i32,
        draft: &ResultDraft,
        updated_by: &str,
    ) -> Result<AssessmentResult, DbError> {
        self.get(assessment_id).await?;
        let result = sqlx::query_as(&format!(
            r#"
            INSERT INTO assessment_results (
                assessment_id, control_id, status, priority, evidence, comments,
                recommendation, management_response, target_date, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (assessment_id, control_id) DO UPDATE SET
                status = EXCLUDED.status,
                priority = EXCLUDED.priority,
                evidence = EXCLUDED.evidence,
                comments = EXCLUDED.comments,
                recommendation = EXCLUDED.recommendation,
                management_response = EXCLUDED.management_response,
                target_date = EXCLUDED.target_date,
                updated_by = EXCLUDED.updated_by,
                updated_at = NOW()
            RETURNING {RESULT_COLUMNS}
            "#
        ))
        .bind(assessment_id)
        .bind(draft.control_id)
        .bind(draft.status.as_str())
        .bind(draft.priority.as_str())
        .bind(draft.evidence.as_deref())
        .bind(draft.comments.as_deref())
        .bind(draft.recommendation.as_deref())
        .bind(draft.management_response.as_deref())
        .bind(draft.target_date.as_deref())
        .bind(updated_by)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::on_missing_parent(e, "control", draft.control_id))?;
        Ok(result)
    }

    /// Results flattened into report entries, in domain then control order.
    pub async fn report_entries(&self, assessment_id: i32) -> Result<Vec<AssessmentEntry>, DbError> {
        self.get(assessment_id).await?;
        let rows: Vec<EntryRow> = sqlx::query_as(
            r#"
            SELECT
                d.display_name AS domain,
                d.sort_order,
                c.control_code,
                c.name AS control_name,
                r.status,
                r.comments,
                r.recommendation,
                r.management_response,
                r.target_date,
                r.priority
            FROM assessment_results r
            JOIN controls c ON c.id = r.control_id
            JOIN domains d ON d.id = c.domain_id
            WHERE r.assessment_id = $1
            ORDER BY d.sort_order, d.id, c.id
            "#,
        )
        .bind(assessment_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(AssessmentEntry::from).collect())
    }
}
