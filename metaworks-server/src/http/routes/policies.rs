//! Policy endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::db::repos::{Policy, PolicyRepo};
use crate::http::auth::CurrentUser;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ValidId};
use crate::http::server::AppState;
use crate::models::{PolicyDraft, PolicyRequest};

/// GET /api/policies
async fn list_policies(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> Result<Json<Vec<Policy>>, ApiError> {
    Ok(Json(PolicyRepo::new(&state.pool).list().await?))
}

/// POST /api/policies - create, or update when the body has an id
async fn save_policy(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ApiJson(req): ApiJson<PolicyRequest>,
) -> Result<(StatusCode, Json<Policy>), ApiError> {
    let draft = PolicyDraft::try_from(req)?;
    let policy = PolicyRepo::new(&state.pool).save(&draft).await?;
    Ok((StatusCode::CREATED, Json(policy)))
}

/// GET /api/policies/{id}
async fn get_policy(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ValidId(id): ValidId,
) -> Result<Json<Policy>, ApiError> {
    Ok(Json(PolicyRepo::new(&state.pool).get(id).await?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/policies", get(list_policies).post(save_policy))
        .route("/api/policies/{id}", get(get_policy))
}
