//! Assessment lifecycle, control results, and the compliance report

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use metaworks_core::{
    build_report, domain_heat, summarize, unique_domains, AssessmentEntry, ComplianceReport,
    DomainHeat, ReportFilter,
};
use serde::Serialize;

use crate::db::repos::{Assessment, AssessmentRepo, AssessmentResult};
use crate::http::auth::CurrentUser;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ApiQuery, ValidId};
use crate::http::server::AppState;
use crate::models::{
    AssessmentStatus, CompanyFilter, CreateAssessmentRequest, NewAssessment, ReportQuery,
    ResultDraft, ResultRequest, StatusUpdate, StatusUpdateRequest,
};

/// Report for one filter selection, plus heat map and filter choices
#[derive(Debug, Serialize)]
pub struct AssessmentReport {
    #[serde(flatten)]
    pub report: ComplianceReport,
    pub heat: Vec<DomainHeat>,
    /// Every domain in the assessment, regardless of filter
    pub domains: Vec<String>,
}

pub fn assessment_report(entries: &[AssessmentEntry], filter: &ReportFilter) -> AssessmentReport {
    let report = build_report(entries, filter);
    let heat = domain_heat(&report.summary);
    AssessmentReport {
        report,
        heat,
        domains: unique_domains(entries),
    }
}

/// GET /api/assessments?companyId=
async fn list_assessments(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ApiQuery(filter): ApiQuery<CompanyFilter>,
) -> Result<Json<Vec<Assessment>>, ApiError> {
    Ok(Json(AssessmentRepo::new(&state.pool).list(filter.company_id).await?))
}

/// POST /api/assessments
async fn create_assessment(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ApiJson(req): ApiJson<CreateAssessmentRequest>,
) -> Result<(StatusCode, Json<Assessment>), ApiError> {
    let new = NewAssessment::try_from(req)?;
    let assessment = AssessmentRepo::new(&state.pool).create(&new).await?;
    Ok((StatusCode::CREATED, Json(assessment)))
}

/// GET /api/assessments/{id}
async fn get_assessment(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ValidId(id): ValidId,
) -> Result<Json<Assessment>, ApiError> {
    Ok(Json(AssessmentRepo::new(&state.pool).get(id).await?))
}

/// PUT /api/assessments/{id}/status
///
/// Completing without a score scores the stored results.
async fn update_status(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ValidId(id): ValidId,
    ApiJson(req): ApiJson<StatusUpdateRequest>,
) -> Result<Json<Assessment>, ApiError> {
    let update = StatusUpdate::try_from(req)?;
    let assessment = transition(&AssessmentRepo::new(&state.pool), id, update).await?;
    Ok(Json(assessment))
}

async fn transition(
    repo: &AssessmentRepo<'_>,
    id: i32,
    mut update: StatusUpdate,
) -> Result<Assessment, ApiError> {
    if update.status == AssessmentStatus::Completed && update.score.is_none() {
        let entries = repo.report_entries(id).await?;
        let score = summarize(&entries).score();
        tracing::info!(assessment_id = id, score, controls = entries.len(), "scored on completion");
        update.score = Some(i32::from(score));
    }

    Ok(repo.update_status(id, &update).await?)
}

/// GET /api/assessments/{id}/results
async fn list_results(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ValidId(id): ValidId,
) -> Result<Json<Vec<AssessmentResult>>, ApiError> {
    Ok(Json(AssessmentRepo::new(&state.pool).list_results(id).await?))
}

/// POST /api/assessments/{id}/results - upsert by control
async fn save_result(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidId(id): ValidId,
    ApiJson(req): ApiJson<ResultRequest>,
) -> Result<(StatusCode, Json<AssessmentResult>), ApiError> {
    let draft = ResultDraft::try_from(req)?;
    let result = AssessmentRepo::new(&state.pool)
        .upsert_result(id, &draft, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// GET /api/assessments/{id}/report?domain=&priority=
async fn report(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ValidId(id): ValidId,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> Result<Json<AssessmentReport>, ApiError> {
    let filter = ReportFilter::try_from(query)?;
    let entries = AssessmentRepo::new(&state.pool).report_entries(id).await?;
    Ok(Json(assessment_report(&entries, &filter)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/assessments", get(list_assessments).post(create_assessment))
        .route("/api/assessments/{id}", get(get_assessment))
        .route("/api/assessments/{id}/status", put(update_status))
        .route("/api/assessments/{id}/results", get(list_results).post(save_result))
        .route("/api/assessments/{id}/report", get(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use metaworks_core::{ControlStatus, Priority};

    fn entry(domain: &str, code: &str, status: ControlStatus, priority: Priority) -> AssessmentEntry {
        AssessmentEntry {
            domain: domain.into(),
            subdomain: String::new(),
            domain_code: String::new(),
            control_code: code.into(),
            control_name: String::new(),
            status,
            current_status: String::new(),
            recommendation: String::new(),
            management_response: String::new(),
            target_date: String::new(),
            priority,
        }
    }

    #[test]
    fn report_keeps_all_domains_for_pickers() {
        let entries = vec![
            entry("Governance", "1.1", ControlStatus::Implemented, Priority::High),
            entry("Defense", "2.1", ControlStatus::NotImplemented, Priority::Low),
        ];
        let filter = ReportFilter {
            domain: Some("Governance".into()),
            priority: None,
        };

        let report = assessment_report(&entries, &filter);
        assert_eq!(report.report.score, 100);
        assert_eq!(report.domains, vec!["Governance", "Defense"]);
        assert_eq!(report.heat.len(), 1);
        assert_eq!(report.heat[0].risk_level, 0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["score"], 100);
        assert!(json["chart"].is_object());
        assert!(json["heat"].is_array());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn completion_scores_stored_results() {
        use crate::db::repos::FrameworkRepo;
        use crate::models::{ControlDraft, DomainDraft, FrameworkDraft};

        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();

        let tag = uuid::Uuid::new_v4().simple().to_string();
        let frameworks = FrameworkRepo::new(&pool);
        let framework = frameworks
            .upsert(&FrameworkDraft {
                name: format!("fw-{tag}"),
                display_name: "Test Framework".into(),
                description: None,
                version: None,
            })
            .await
            .unwrap();
        let domain = frameworks
            .upsert_domain(&DomainDraft {
                framework_id: framework.id,
                name: "governance".into(),
                display_name: "Governance".into(),
                description: None,
                sort_order: 1,
            })
            .await
            .unwrap();

        let repo = AssessmentRepo::new(&pool);
        let assessment = repo
            .create(&NewAssessment {
                company_id: None,
                framework_id: framework.id,
                name: "Baseline".into(),
                start_date: chrono::Utc::now(),
            })
            .await
            .unwrap();

        let statuses = [
            ControlStatus::Implemented,
            ControlStatus::Implemented,
            ControlStatus::PartiallyImplemented,
            ControlStatus::NotImplemented,
        ];
        for (i, status) in statuses.into_iter().enumerate() {
            let control = frameworks
                .upsert_control(&ControlDraft {
                    domain_id: domain.id,
                    control_code: format!("1.{}", i + 1),
                    name: format!("Control {}", i + 1),
                    description: None,
                    guidance: None,
                    maturity_level: None,
                    reference_links: None,
                    implementation_guide: None,
                })
                .await
                .unwrap();
            let draft = ResultDraft {
                control_id: control.id,
                status,
                priority: Priority::Medium,
                evidence: None,
                comments: None,
                recommendation: None,
                management_response: None,
                target_date: None,
            };
            repo.upsert_result(assessment.id, &draft, "auditor").await.unwrap();
        }

        let entries = repo.report_entries(assessment.id).await.unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(assessment_report(&entries, &ReportFilter::default()).report.score, 63);

        let update = StatusUpdate {
            status: AssessmentStatus::Completed,
            score: None,
        };
        let completed = transition(&repo, assessment.id, update).await.unwrap();
        assert_eq!(completed.status, AssessmentStatus::Completed);
        assert_eq!(completed.score, Some(63));
        assert!(completed.completion_date.is_some());
    }
}
