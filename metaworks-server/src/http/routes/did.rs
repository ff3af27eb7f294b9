//! Conversational agent widget configuration
//!
//! The browser loads the agent script itself; this endpoint only hands over
//! the script URL and the credentials held in server config.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub agent_id: String,
    pub client_key: String,
    pub mode: &'static str,
    pub monitor: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub script_url: String,
    pub agent_config: AgentConfig,
}

/// GET /api/did/config
async fn widget_config(State(state): State<Arc<AppState>>) -> Result<Json<WidgetConfig>, ApiError> {
    let integrations = &state.integrations;
    let credentials = integrations
        .did_agent_id
        .as_deref()
        .zip(integrations.did_client_key.as_deref())
        .filter(|(agent, key)| !agent.is_empty() && !key.is_empty());

    let Some((agent_id, client_key)) = credentials else {
        return Err(ApiError::internal("agent credentials are not configured"));
    };

    Ok(Json(WidgetConfig {
        script_url: integrations.did_script_url.clone(),
        agent_config: AgentConfig {
            agent_id: agent_id.to_owned(),
            client_key: client_key.to_owned(),
            mode: "fabio",
            monitor: true,
        },
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/did/config", get(widget_config))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, body_json, get, state};
    use axum::http::StatusCode;
    use metaworks_core::config::IntegrationsSection;
    use tower::ServiceExt;

    #[tokio::test]
    async fn missing_credentials_is_500() {
        let response = app(state(IntegrationsSection::default()))
            .oneshot(get("/api/did/config"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn returns_script_and_agent() {
        let integrations = IntegrationsSection {
            did_agent_id: Some("agt_123".into()),
            did_client_key: Some("key_456".into()),
            ..IntegrationsSection::default()
        };
        let response = app(state(integrations))
            .oneshot(get("/api/did/config"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["scriptUrl"], "https://agent.d-id.com/v1/index.js");
        assert_eq!(body["agentConfig"]["agentId"], "agt_123");
        assert_eq!(body["agentConfig"]["clientKey"], "key_456");
        assert_eq!(body["agentConfig"]["mode"], "fabio");
        assert_eq!(body["agentConfig"]["monitor"], true);
    }
}
