//! Admin user management

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::db::repos::{User, UserRepo};
use crate::http::auth::{hash_password, AdminUser};
use crate::http::error::ApiError;
use crate::http::extractors::ApiJson;
use crate::http::server::AppState;
use crate::models::{CreateUserRequest, NewUser};

/// GET /api/users
async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(UserRepo::new(&state.pool).list().await?))
}

/// POST /api/users - a taken username is a 400
async fn create_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let new_user = NewUser::try_from(req)?;
    let password_hash = hash_password(&new_user.password)?;
    let user = UserRepo::new(&state.pool)
        .create(&new_user, &password_hash)
        .await?;

    tracing::info!(admin_id = admin.id, user_id = user.id, "admin created user");
    Ok((StatusCode::CREATED, Json(user)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/users", get(list_users).post(create_user))
}
