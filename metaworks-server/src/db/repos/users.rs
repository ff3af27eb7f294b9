//! User accounts
//!
//! Registration writes the user and the first session in one transaction.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::DbError;
use crate::models::NewUser;

/// User record. The hash never leaves the server.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub access_level: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

const USER_COLUMNS: &str =
    "id, username, password_hash, role, access_level, is_active, created_at";

pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a user. A taken username is `Conflict`.
    pub async fn create(&self, user: &NewUser, password_hash: &str) -> Result<User, DbError> {
        self.create_with_session(user, password_hash, None).await
    }

    /// Insert a user and, when given, open a session for it atomically.
    pub async fn create_with_session(
        &self,
        user: &NewUser,
        password_hash: &str,
        session: Option<(&str, DateTime<Utc>)>,
    ) -> Result<User, DbError> {
        let mut tx = self.pool.begin().await?;

        let created: User = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (username, password_hash, role, access_level, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.username.as_str())
        .bind(password_hash)
        .bind(user.role.as_str())
        .bind(&user.access_level)
        .bind(user.is_active)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DbError::on_unique(e, "user", user.username.as_str()))?;

        if let Some((token, expires_at)) = session {
            sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
                .bind(token)
                .bind(created.id)
                .bind(expires_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::info!(user_id = created.id, username = %created.username, role = %created.role, "user created");
        Ok(created)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    pub async fn get(&self, id: i32) -> Result<User, DbError> {
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", id))
    }

    pub async fn list(&self) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(self.pool)
            .await?;
        Ok(users)
    }
}
