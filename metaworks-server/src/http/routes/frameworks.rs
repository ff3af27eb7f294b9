//! Framework, domain and control reference data
//!
//! Reads need a session; writes need an admin.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::db::repos::{Control, Domain, Framework, FrameworkRepo};
use crate::http::auth::{AdminUser, CurrentUser};
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ValidId};
use crate::http::server::AppState;
use crate::models::{
    ControlDraft, ControlRequest, DomainDraft, DomainRequest, FrameworkDraft, FrameworkRequest,
};

/// A control as listed under its domain, with a positional code ("C1", "C2", ...)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedControl {
    #[serde(flatten)]
    pub control: Control,
    pub code: String,
    pub domain_name: String,
}

fn with_codes(domain: &Domain, controls: Vec<Control>) -> Vec<ListedControl> {
    controls
        .into_iter()
        .enumerate()
        .map(|(i, control)| ListedControl {
            control,
            code: format!("C{}", i + 1),
            domain_name: domain.name.clone(),
        })
        .collect()
}

/// GET /api/frameworks
async fn list_frameworks(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> Result<Json<Vec<Framework>>, ApiError> {
    Ok(Json(FrameworkRepo::new(&state.pool).list().await?))
}

/// POST /api/frameworks
async fn save_framework(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<FrameworkRequest>,
) -> Result<(StatusCode, Json<Framework>), ApiError> {
    let draft = FrameworkDraft::try_from(req)?;
    let framework = FrameworkRepo::new(&state.pool).upsert(&draft).await?;
    Ok((StatusCode::CREATED, Json(framework)))
}

/// GET /api/frameworks/{id}
async fn get_framework(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ValidId(id): ValidId,
) -> Result<Json<Framework>, ApiError> {
    Ok(Json(FrameworkRepo::new(&state.pool).get(id).await?))
}

/// GET /api/frameworks/{id}/domains
async fn list_domains(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ValidId(id): ValidId,
) -> Result<Json<Vec<Domain>>, ApiError> {
    Ok(Json(FrameworkRepo::new(&state.pool).list_domains(id).await?))
}

/// POST /api/domains
async fn save_domain(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<DomainRequest>,
) -> Result<(StatusCode, Json<Domain>), ApiError> {
    let draft = DomainDraft::try_from(req)?;
    let domain = FrameworkRepo::new(&state.pool).upsert_domain(&draft).await?;
    Ok((StatusCode::CREATED, Json(domain)))
}

/// GET /api/domains/{id}/controls
async fn list_controls(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ValidId(id): ValidId,
) -> Result<Json<Vec<ListedControl>>, ApiError> {
    let (domain, controls) = FrameworkRepo::new(&state.pool).list_controls(id).await?;
    Ok(Json(with_codes(&domain, controls)))
}

/// GET /api/controls/{id}
async fn get_control(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ValidId(id): ValidId,
) -> Result<Json<Control>, ApiError> {
    Ok(Json(FrameworkRepo::new(&state.pool).get_control(id).await?))
}

/// POST /api/controls
async fn save_control(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<ControlRequest>,
) -> Result<(StatusCode, Json<Control>), ApiError> {
    let draft = ControlDraft::try_from(req)?;
    let control = FrameworkRepo::new(&state.pool).upsert_control(&draft).await?;
    Ok((StatusCode::CREATED, Json(control)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/frameworks", get(list_frameworks).post(save_framework))
        .route("/api/frameworks/{id}", get(get_framework))
        .route("/api/frameworks/{id}/domains", get(list_domains))
        .route("/api/domains", post(save_domain))
        .route("/api/domains/{id}/controls", get(list_controls))
        .route("/api/controls", post(save_control))
        .route("/api/controls/{id}", get(get_control))
}
