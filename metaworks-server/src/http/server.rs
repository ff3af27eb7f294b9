//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default (credentials allowed for the session cookie)
//! - Tracing, request timeout and body limit middleware
//! - Static serving of uploads
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::Router;
use metaworks_core::config::{IntegrationsSection, ServerSection};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::db::repos::SessionRepo;
use crate::integrations::{ChatClient, OpenAiClient};

const DEFAULT_ORIGINS: [&str; 4] = [
    "http://localhost:5000",
    "http://localhost:5173",
    "http://127.0.0.1:5000",
    "http://127.0.0.1:5173",
];

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:5000)
    pub bind_addr: SocketAddr,

    /// Allow any origin (default: false = localhost plus `cors_origins`)
    ///
    /// WARNING: Only use for development.
    pub cors_permissive: bool,

    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub session_ttl_hours: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            cors_permissive: false,
            cors_origins: Vec::new(),
            request_timeout: Duration::from_secs(30),
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 10 * 1024 * 1024,
            session_ttl_hours: 24 * 7,
        }
    }
}

impl TryFrom<&ServerSection> for ServerConfig {
    type Error = ServerError;

    fn try_from(section: &ServerSection) -> Result<Self, Self::Error> {
        let bind_addr = section
            .bind
            .parse()
            .map_err(|_| ServerError::InvalidBind(section.bind.clone()))?;
        Ok(Self {
            bind_addr,
            cors_permissive: section.cors_permissive,
            cors_origins: section.cors_origins.clone(),
            request_timeout: Duration::from_secs(section.request_timeout_secs),
            upload_dir: section.upload_dir.clone(),
            max_upload_bytes: section.max_upload_bytes,
            session_ttl_hours: section.session_ttl_hours,
        })
    }
}

/// Shared application state
pub struct AppState {
    pub pool: PgPool,
    pub config: ServerConfig,
    pub integrations: IntegrationsSection,
    /// Present only when an API key is configured
    pub chat: Option<Arc<dyn ChatClient>>,
}

impl AppState {
    /// Build state, wiring the chat client when a key is configured.
    pub fn new(
        pool: PgPool,
        config: ServerConfig,
        integrations: IntegrationsSection,
    ) -> Result<Self, ServerError> {
        let chat = match integrations.openai_api_key.as_deref() {
            Some(key) if !key.is_empty() => {
                let client = OpenAiClient::new(
                    key,
                    integrations.openai_model.as_str(),
                    integrations.openai_base_url.as_str(),
                )
                .map_err(|e| ServerError::Integration(e.to_string()))?;
                Some(Arc::new(client) as Arc<dyn ChatClient>)
            }
            _ => {
                tracing::warn!("OPENAI_API_KEY not set - mascot answers disabled");
                None
            }
        };

        Ok(Self {
            pool,
            config,
            integrations,
            chat,
        })
    }

    pub fn with_chat_client(mut self, chat: Arc<dyn ChatClient>) -> Self {
        self.chat = Some(chat);
        self
    }
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::very_permissive();
    }

    let origins: Vec<HeaderValue> = DEFAULT_ORIGINS
        .into_iter()
        .map(HeaderValue::from_static)
        .chain(config.cors_origins.iter().filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        }))
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Assemble every route plus middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let config = &state.config;

    Router::new()
        .merge(routes::health::router())
        .merge(routes::auth::router())
        .merge(routes::users::router())
        .merge(routes::company::router())
        .merge(routes::policies::router())
        .merge(routes::risks::router())
        .merge(routes::frameworks::router())
        .merge(routes::assessments::router())
        .merge(routes::remediation::router())
        .merge(routes::files::router())
        .merge(routes::forms::router())
        .merge(routes::mascot::router())
        .merge(routes::did::router())
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes + MULTIPART_OVERHEAD))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&database_url).await?;
/// let state = AppState::new(pool, ServerConfig::default(), IntegrationsSection::default())?;
/// run_server(state).await?;
/// ```
pub async fn run_server(state: AppState) -> Result<(), ServerError> {
    tokio::fs::create_dir_all(&state.config.upload_dir).await?;
    let bind_addr = state.config.bind_addr;
    let sweeper = spawn_session_sweeper(state.pool.clone());
    let app = build_router(Arc::new(state));

    // Bind listener
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    // Run with graceful shutdown
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    sweeper.abort();
    served?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Purge expired sessions at startup and then hourly.
fn spawn_session_sweeper(pool: PgPool) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            match SessionRepo::new(&pool).purge_expired().await {
                Ok(0) => {}
                Ok(purged) => tracing::info!(purged, "expired sessions removed"),
                Err(e) => tracing::warn!("session sweep failed: {}", e),
            }
        }
    })
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid bind address '{0}'")]
    InvalidBind(String),

    #[error("integration setup failed: {0}")]
    Integration(String),
}
