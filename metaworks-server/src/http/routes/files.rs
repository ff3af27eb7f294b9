//! File uploads (multipart), stored under the upload dir and served at /uploads

use std::path::Path;
use std::sync::Arc;

use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::db::repos::{FileRepo, StoredFile};
use crate::http::auth::CurrentUser;
use crate::http::error::ApiError;
use crate::http::server::AppState;

const FILE_FIELD: &str = "file";
const MAX_EXTENSION_LEN: usize = 8;

#[derive(Debug, Serialize)]
pub struct UploadedFile {
    #[serde(flatten)]
    pub file: StoredFile,
    pub url: String,
}

/// Random stored name, keeping a short alphanumeric extension if present.
fn stored_name(original: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    match original.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            format!("{id}.{}", ext.to_ascii_lowercase())
        }
        _ => id,
    }
}

fn multipart_error(e: MultipartError, max_bytes: usize) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::bad_request(format!("file exceeds the {max_bytes} byte upload limit"))
    } else {
        ApiError::bad_request(e.body_text())
    }
}

/// Remove a stored file that never got its row.
async fn discard_orphan(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), "failed to remove orphaned upload: {}", e);
    }
}

/// POST /api/files
async fn upload(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadedFile>), ApiError> {
    let file = store_upload(&state, user.id, multipart).await?;
    Ok((StatusCode::CREATED, Json(file)))
}

/// Write the `file` field to the upload dir and record it.
async fn store_upload(
    state: &AppState,
    user_id: i32,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadedFile, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let max_bytes = state.config.max_upload_bytes;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original_name = field
            .file_name()
            .map(|n| n.rsplit(['/', '\\']).next().unwrap_or(n).trim().to_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "upload".to_owned());
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.map_err(|e| multipart_error(e, max_bytes))?;

        if bytes.is_empty() {
            return Err(ApiError::bad_request("uploaded file is empty"));
        }
        if bytes.len() > max_bytes {
            return Err(ApiError::bad_request(format!(
                "file exceeds the {max_bytes} byte upload limit"
            )));
        }

        let name = stored_name(&original_name);
        let path = state.config.upload_dir.join(&name);
        tokio::fs::create_dir_all(&state.config.upload_dir)
            .await
            .map_err(|e| ApiError::internal(format!("create upload dir: {e}")))?;
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| ApiError::internal(format!("write {}: {e}", path.display())))?;

        let file = match FileRepo::new(&state.pool)
            .create(
                &original_name,
                &name,
                content_type.as_deref(),
                bytes.len() as i64,
                user_id,
            )
            .await
        {
            Ok(file) => file,
            Err(e) => {
                discard_orphan(&path).await;
                return Err(e.into());
            }
        };

        tracing::info!(file_id = file.id, size = file.size_bytes, "file uploaded");
        let url = file.url();
        return Ok(UploadedFile { file, url });
    }

    Err(ApiError::bad_request("missing 'file' field"))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/files", post(upload))
}
