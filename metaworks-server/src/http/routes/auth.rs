//! Register, login, logout and the current user

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::db::repos::{SessionRepo, User, UserRepo};
use crate::http::auth::{
    clear_session_cookie, cookie_headers, hash_password, new_session_token, session_cookie,
    session_expiry, session_token, verify_password, CurrentUser,
};
use crate::http::error::ApiError;
use crate::http::extractors::ApiJson;
use crate::http::server::AppState;
use crate::models::{CredentialsRequest, NewUser};

/// POST /api/register - self-service signup, logs the new user in
async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> Result<(StatusCode, HeaderMap, Json<User>), ApiError> {
    let new_user = NewUser::from_credentials(req)?;
    let password_hash = hash_password(&new_user.password)?;
    let token = new_session_token();
    let ttl = state.config.session_ttl_hours;

    let user = UserRepo::new(&state.pool)
        .create_with_session(&new_user, &password_hash, Some((token.as_str(), session_expiry(ttl))))
        .await?;

    Ok((
        StatusCode::CREATED,
        cookie_headers(session_cookie(&token, ttl)?),
        Json(user),
    ))
}

/// POST /api/login
async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> Result<(HeaderMap, Json<User>), ApiError> {
    let user = UserRepo::new(&state.pool)
        .find_by_username(req.username.trim())
        .await?
        .filter(|u| verify_password(&req.password, &u.password_hash));

    let user = match user {
        Some(user) if user.is_active => user,
        Some(user) => {
            tracing::warn!(username = %user.username, "login refused for inactive account");
            return Err(ApiError::Unauthorized);
        }
        None => {
            tracing::warn!(username = %req.username.trim(), "login failed");
            return Err(ApiError::Unauthorized);
        }
    };

    let token = new_session_token();
    let ttl = state.config.session_ttl_hours;
    SessionRepo::new(&state.pool)
        .create(&token, user.id, session_expiry(ttl))
        .await?;

    tracing::info!(user_id = user.id, "user logged in");
    Ok((cookie_headers(session_cookie(&token, ttl)?), Json(user)))
}

/// POST /api/logout - always succeeds, even without a session
async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<(StatusCode, HeaderMap), ApiError> {
    if let Some(token) = session_token(&headers) {
        SessionRepo::new(&state.pool).delete(&token).await?;
    }
    Ok((StatusCode::NO_CONTENT, cookie_headers(clear_session_cookie())))
}

/// GET /api/user
async fn current_user(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/user", get(current_user))
}
