//! Risk register

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::DbError;
use crate::models::RiskDraft;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub id: i32,
    pub company_id: Option<i32>,
    pub title: String,
    pub description: String,
    pub cause: Option<String>,
    pub category: String,
    pub owner: Option<String>,
    pub likelihood: String,
    pub impact: String,
    pub inherent_risk_level: String,
    pub existing_controls: Option<String>,
    pub control_effectiveness: Option<String>,
    pub residual_risk_level: Option<String>,
    pub mitigation_actions: Option<String>,
    pub target_date: Option<String>,
    pub is_accepted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const RISK_COLUMNS: &str = "id, company_id, title, description, cause, category, owner, \
    likelihood, impact, inherent_risk_level, existing_controls, control_effectiveness, \
    residual_risk_level, mitigation_actions, target_date, is_accepted, created_at, updated_at";

pub struct RiskRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> RiskRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Newest first, optionally scoped to one company.
    pub async fn list(&self, company_id: Option<i32>) -> Result<Vec<Risk>, DbError> {
        let risks = sqlx::query_as(&format!(
            r#"
            SELECT {RISK_COLUMNS} FROM risks
            WHERE $1::int IS NULL OR company_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(company_id)
        .fetch_all(self.pool)
        .await?;
        Ok(risks)
    }

    pub async fn count(&self, company_id: Option<i32>) -> Result<i64, DbError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM risks WHERE $1::int IS NULL OR company_id = $1")
                .bind(company_id)
                .fetch_one(self.pool)
                .await?;
        Ok(count)
    }

    pub async fn get(&self, id: i32) -> Result<Risk, DbError> {
        sqlx::query_as(&format!("SELECT {RISK_COLUMNS} FROM risks WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("risk", id))
    }

    /// Insert, or update when the draft carries an id.
    pub async fn save(&self, draft: &RiskDraft) -> Result<Risk, DbError> {
        let query = match draft.id {
            Some(_) => format!(
                r#"
                UPDATE risks SET
                    company_id = COALESCE($2, company_id), title = $3, description = $4,
                    cause = $5, category = $6, owner = $7, likelihood = $8, impact = $9,
                    inherent_risk_level = $10, existing_controls = $11,
                    control_effectiveness = $12, residual_risk_level = $13,
                    mitigation_actions = $14, target_date = $15, is_accepted = $16,
                    updated_at = NOW()
                WHERE id = $1
                RETURNING {RISK_COLUMNS}
                "#
            ),
            None => format!(
                r#"
                INSERT INTO risks (
                    company_id, title, description, cause, category, owner, likelihood,
                    impact, inherent_risk_level, existing_controls, control_effectiveness,
                    residual_risk_level, mitigation_actions, target_date, is_accepted
                )
                SELECT $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16
                WHERE $1::int IS NULL
                RETURNING {RISK_COLUMNS}
                "#
            ),
        };

        sqlx::query_as(&query)
            .bind(draft.id)
            .bind(draft.company_id)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(draft.cause.as_deref())
            .bind(&draft.category)
            .bind(draft.owner.as_deref())
            .bind(&draft.likelihood)
            .bind(&draft.impact)
            .bind(&draft.inherent_risk_level)
            .bind(draft.existing_controls.as_deref())
            .bind(draft.control_effectiveness.as_deref())
            .bind(draft.residual_risk_level.as_deref())
            .bind(draft.mitigation_actions.as_deref())
            .bind(draft.target_date.as_deref())
            .bind(draft.is_accepted)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| {
                DbError::on_missing_parent(e, "company", draft.company_id.unwrap_or_default())
            })?
            .ok_or_else(|| DbError::not_found("risk", draft.id.unwrap_or_default()))
    }

    pub async fn delete(&self, id: i32) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM risks WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("risk", id));
        }
        Ok(())
    }
}
