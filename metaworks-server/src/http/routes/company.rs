//! Company profile endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::db::repos::{CompanyInfo, CompanyRepo};
use crate::http::auth::CurrentUser;
use crate::http::error::ApiError;
use crate::http::extractors::ApiJson;
use crate::http::server::AppState;
use crate::models::{CompanyInfoRequest, CompanyUpdate};

/// GET /api/company-info - `{cybersecurityStaff: []}` before the first save
async fn get_company(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> Result<Json<Value>, ApiError> {
    let body = match CompanyRepo::new(&state.pool).get().await? {
        Some(info) => serde_json::to_value(info)
            .map_err(|e| ApiError::internal(format!("serialize company info: {e}")))?,
        None => json!({ "cybersecurityStaff": [] }),
    };
    Ok(Json(body))
}

/// POST /api/company-info
async fn save_company(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    ApiJson(req): ApiJson<CompanyInfoRequest>,
) -> Result<(StatusCode, Json<CompanyInfo>), ApiError> {
    let update = CompanyUpdate::try_from(req)?;
    let info = CompanyRepo::new(&state.pool).save(&update).await?;
    Ok((StatusCode::CREATED, Json(info)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/company-info", get(get_company).post(save_company))
}
