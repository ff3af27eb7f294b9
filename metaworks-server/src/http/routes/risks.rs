//! Risk register endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;

use crate::db::repos::{DbError, Risk, RiskRepo};
use crate::http::auth::CurrentUser;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ApiQuery, ValidId};
use crate::http::server::AppState;
use crate::models::{CompanyFilter, ImportRisksRequest, RiskDraft, RiskRequest};

#[derive(Serialize)]
pub struct RiskCount {
    pub count: i64,
}

/// Outcome for one imported row. Failed rows echo the submitted JSON.
#[derive(Debug, Serialize)]
pub struct ImportOutcome {
    pub success: bool,
    pub risk: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total_processed: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub results: Vec<ImportOutcome>,
}

impl ImportSummary {
    fn from_outcomes(results: Vec<ImportOutcome>) -> Self {
        let success_count = results.iter().filter(|r| r.success).count();
        Self {
            total_processed: results.len(),
            success_count,
            failure_count: results.len() - success_count,
            results,
        }
    }
}

/// Parse and validate one import row, forcing the batch's company.
fn import_draft(row: &Value, company_id: Option<i32>) -> Result<RiskDraft, String> {
    let mut req: RiskRequest = serde_json::from_value(row.clone()).map_err(|e| e.to_string())?;
    if company_id.is_some() {
        req.company_id = company_id;
    }
    RiskDraft::try_from(req).map_err(|e| e.to_string())
}

/// GET /api/risks?companyId=
async fn list_risks(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ApiQuery(filter): ApiQuery<CompanyFilter>,
) -> Result<Json<Vec<Risk>>, ApiError> {
    Ok(Json(RiskRepo::new(&state.pool).list(filter.company_id).await?))
}

/// GET /api/risks/count?companyId=
async fn count_risks(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ApiQuery(filter): ApiQuery<CompanyFilter>,
) -> Result<Json<RiskCount>, ApiError> {
    let count = RiskRepo::new(&state.pool).count(filter.company_id).await?;
    Ok(Json(RiskCount { count }))
}

/// GET /api/risks/{id}
async fn get_risk(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ValidId(id): ValidId,
) -> Result<Json<Risk>, ApiError> {
    Ok(Json(RiskRepo::new(&state.pool).get(id).await?))
}

/// POST /api/risks - create, or update when the body has an id
async fn save_risk(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ApiJson(req): ApiJson<RiskRequest>,
) -> Result<(StatusCode, Json<Risk>), ApiError> {
    let draft = RiskDraft::try_from(req)?;
    let risk = RiskRepo::new(&state.pool).save(&draft).await?;
    Ok((StatusCode::CREATED, Json(risk)))
}

/// DELETE /api/risks/{id}
async fn delete_risk(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ValidId(id): ValidId,
) -> Result<StatusCode, ApiError> {
    RiskRepo::new(&state.pool).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/risks/import - every row is tried; failures do not stop the batch
async fn import_risks(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ApiJson(req): ApiJson<ImportRisksRequest>,
) -> Result<(StatusCode, Json<ImportSummary>), ApiError> {
    let repo = RiskRepo::new(&state.pool);
    let mut outcomes = Vec::with_capacity(req.risks.len());

    for row in req.risks {
        let saved = match import_draft(&row, req.company_id) {
            Ok(draft) => repo.save(&draft).await.map_err(|e| match e {
                DbError::Sqlx(inner) => {
                    tracing::error!("risk import row failed: {}", inner);
                    "failed to save risk".to_string()
                }
                other => other.to_string(),
            }),
            Err(reason) => Err(reason),
        };

        outcomes.push(match saved {
            Ok(risk) => ImportOutcome {
                success: true,
                risk: serde_json::to_value(&risk).unwrap_or(row),
                error: None,
            },
            Err(reason) => ImportOutcome {
                success: false,
                risk: row,
                error: Some(reason),
            },
        });
    }

    let summary = ImportSummary::from_outcomes(outcomes);
    tracing::info!(
        total = summary.total_processed,
        ok = summary.success_count,
        failed = summary.failure_count,
        "risk import finished"
    );
    Ok((StatusCode::CREATED, Json(summary)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/risks", get(list_risks).post(save_risk))
        .route("/api/risks/count", get(count_risks))
        .route("/api/risks/import", post(import_risks))
        .route("/api/risks/{id}", get(get_risk).delete(delete_risk))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn import_row_validation() {
        let row = json!({"title": "Phishing", "description": "Credential theft"});
        let err = import_draft(&row, None).unwrap_err();
        assert_eq!(err, "category cannot be empty");

        let row = json!({
            "title": "Phishing",
            "description": "Credential theft",
            "category": "Cyber",
            "likelihood": "Likely",
            "impact": "Major",
            "inherentRiskLevel": "High",
            "companyId": 1
        });
        assert_eq!(import_draft(&row, Some(7)).unwrap().company_id, Some(7));
        assert_eq!(import_draft(&row, None).unwrap().company_id, Some(1));
    }

    #[test]
    fn non_object_row_fails_alone() {
        assert!(import_draft(&json!("not a risk"), None).is_err());
    }

    #[test]
    fn summary_counts() {
        let summary = ImportSummary::from_outcomes(vec![
            ImportOutcome {
                success: true,
                risk: json!({}),
                error: None,
            },
            ImportOutcome {
                success: false,
                risk: json!({}),
                error: Some("bad".into()),
            },
        ]);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["totalProcessed"], 2);
        assert_eq!(json["successCount"], 1);
        assert_eq!(json["failureCount"], 1);
        assert!(json["results"][0].get("error").is_none());
    }
}
