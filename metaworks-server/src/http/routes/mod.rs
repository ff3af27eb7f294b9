//! Route handlers organized by resource

pub mod assessments;
pub mod auth;
pub mod company;
pub mod did;
pub mod files;
pub mod forms;
pub mod frameworks;
pub mod health;
pub mod mascot;
pub mod policies;
pub mod remediation;
pub mod risks;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::response::Response;
    use axum::Router;
    use metaworks_core::config::IntegrationsSection;
    use sqlx::postgres::PgPoolOptions;

    use crate::http::server::{build_router, AppState, ServerConfig};

    /// State over a pool that never connects. Good for routes that reject
    /// before touching the database.
    pub fn state(integrations: IntegrationsSection) -> AppState {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/metaworks_unused")
            .unwrap();
        AppState::new(pool, ServerConfig::default(), integrations).unwrap()
    }

    /// Like `state`, with uploads going to `dir` and a pool that gives up
    /// quickly, so database calls fail fast.
    pub fn state_with_upload_dir(dir: &Path) -> AppState {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(500))
            .connect_lazy("postgres://127.0.0.1:1/metaworks_unused")
            .unwrap();
        let config = ServerConfig {
            upload_dir: dir.to_path_buf(),
            ..ServerConfig::default()
        };
        AppState::new(pool, config, IntegrationsSection::default()).unwrap()
    }

    pub fn app(state: AppState) -> Router {
        build_router(Arc::new(state))
    }

    pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
