//! Session authentication
//!
//! Passwords are stored as argon2id PHC strings (salt embedded).
//! A login creates a row in `sessions`; the opaque token travels in the
//! `metaworks_session` cookie.

use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use chrono::{DateTime, Duration, Utc};

use super::error::ApiError;
use super::server::AppState;
use crate::db::repos::{SessionRepo, User};
use crate::models::Password;

pub const SESSION_COOKIE: &str = "metaworks_session";

const SALT_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordHashError(String);

impl From<PasswordHashError> for ApiError {
    fn from(e: PasswordHashError) -> Self {
        ApiError::internal(e.to_string())
    }
}

pub fn hash_password(password: &Password) -> Result<String, PasswordHashError> {
    let salt_bytes: [u8; SALT_LEN] = rand::random();
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| PasswordHashError(e.to_string()))?;
    let hash = Argon2::default()
        .hash_password(password.expose().as_bytes(), &salt)
        .map_err(|e| PasswordHashError(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check a plaintext password against a stored hash. Malformed hashes never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// 32 random bytes, hex encoded.
pub fn new_session_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// Ten years; longer TTLs are clamped.
const MAX_TTL_HOURS: u64 = 24 * 365 * 10;

pub fn session_expiry(ttl_hours: u64) -> DateTime<Utc> {
    Utc::now() + Duration::hours(ttl_hours.min(MAX_TTL_HOURS) as i64)
}

pub fn session_cookie(token: &str, ttl_hours: u64) -> Result<HeaderValue, ApiError> {
    let max_age = ttl_hours.min(MAX_TTL_HOURS) * 3600;
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age}"
    ))
    .map_err(|e| ApiError::internal(format!("invalid session cookie: {e}")))
}

pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("metaworks_session=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

/// `Set-Cookie` header map for a response.
pub fn cookie_headers(value: HeaderValue) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, value);
    headers
}

/// The session token from the request's `Cookie` headers, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_owned())
        .filter(|token| !token.is_empty())
}

/// The logged-in user. Rejects with 401.
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(ApiError::Unauthorized)?;
        let user = SessionRepo::new(&state.pool)
            .user_for_token(&token)
            .await?
            .ok_or(ApiError::Unauthorized)?;
        Ok(Self(user))
    }
}

/// A logged-in admin. 401 without a session, 403 for other roles.
pub struct AdminUser(pub User);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::Forbidden {
                reason: "admin role required".into(),
            });
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let password = Password::new("correct horse battery").unwrap();
        let stored = hash_password(&password).unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert!(verify_password("correct horse battery", &stored));
        assert!(!verify_password("wrong password", &stored));
    }

    #[test]
    fn hashes_are_salted() {
        let password = Password::new("same password").unwrap();
        assert_ne!(hash_password(&password).unwrap(), hash_password(&password).unwrap());
    }

    #[test]
    fn malformed_hash_never_matches() {
        assert!(!verify_password("anything", "no-separator"));
        assert!(!verify_password("anything", "zz$zz"));
        assert!(!verify_password("anything", "abc$def"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn token_shape() {
        let token = new_session_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn cookie_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; metaworks_session=abc123; lang=ar"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));

        headers.insert(COOKIE, HeaderValue::from_static("metaworks_session="));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie("tok", 2).unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("metaworks_session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=7200"));
    }
}
