//! Remediation task endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::db::repos::{AssessmentRepo, RemediationRepo, RemediationTask};
use crate::http::auth::CurrentUser;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ValidId};
use crate::http::server::AppState;
use crate::models::{TaskDraft, TaskRequest, TaskStatus, TaskStatusRequest};

/// GET /api/assessments/{id}/tasks
async fn list_tasks(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ValidId(id): ValidId,
) -> Result<Json<Vec<RemediationTask>>, ApiError> {
    AssessmentRepo::new(&state.pool).get(id).await?;
    Ok(Json(RemediationRepo::new(&state.pool).list(id).await?))
}

/// POST /api/assessments/{id}/tasks
async fn save_task(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ValidId(id): ValidId,
    ApiJson(req): ApiJson<TaskRequest>,
) -> Result<(StatusCode, Json<RemediationTask>), ApiError> {
    let draft = TaskDraft::try_from(req)?;
    AssessmentRepo::new(&state.pool).get(id).await?;
    let task = RemediationRepo::new(&state.pool).upsert(id, &draft).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /api/tasks/{id}/status
async fn update_task_status(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ValidId(id): ValidId,
    ApiJson(req): ApiJson<TaskStatusRequest>,
) -> Result<Json<RemediationTask>, ApiError> {
    let status: TaskStatus = req.status.parse()?;
    Ok(Json(RemediationRepo::new(&state.pool).update_status(id, status).await?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/assessments/{id}/tasks", get(list_tasks).post(save_task))
        .route("/api/tasks/{id}/status", put(update_task_status))
}
