//! Security mascot Q&A backed by a chat completion API

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use metaworks_core::{MascotPrompt, Personality};
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::extractors::ApiJson;
use crate::http::server::AppState;
use crate::integrations::ChatClient;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
    pub personality: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TipRequest {
    #[serde(default)]
    pub context: String,
    pub personality: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct TipResponse {
    pub tip: String,
}

fn personality(name: Option<&str>) -> Personality {
    name.map(Personality::from_name).unwrap_or_default()
}

fn chat_client(state: &AppState) -> Result<&Arc<dyn ChatClient>, ApiError> {
    state
        .chat
        .as_ref()
        .ok_or(ApiError::Unavailable { service: "mascot" })
}

/// POST /api/mascot/ask
async fn ask(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let prompt = MascotPrompt::new(personality(req.personality.as_deref()), &req.question)?;
    let answer = chat_client(&state)?.complete(&prompt).await?;
    Ok(Json(AskResponse { answer }))
}

/// POST /api/mascot/contextual-tips
async fn contextual_tip(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<TipRequest>,
) -> Result<Json<TipResponse>, ApiError> {
    let prompt =
        MascotPrompt::contextual_tip(personality(req.personality.as_deref()), &req.context)?;
    let tip = chat_client(&state)?.complete(&prompt).await?;
    Ok(Json(TipResponse { tip }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/mascot/ask", post(ask))
        .route("/api/mascot/contextual-tips", post(contextual_tip))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use super::super::test_support::{app, body_json, json_request, state};
    use super::*;
    use crate::integrations::IntegrationError;

    /// Records prompts and replies with a canned answer, or fails.
    #[derive(Default)]
    struct StubChat {
        fail: bool,
        seen: Mutex<Vec<MascotPrompt>>,
    }

    #[async_trait]
    impl ChatClient for StubChat {
        async fn complete(&self, prompt: &MascotPrompt) -> Result<String, IntegrationError> {
            self.seen.lock().unwrap().push(prompt.clone());
            if self.fail {
                return Err(IntegrationError::Status {
                    status: 500,
                    body: "boom".into(),
                });
            }
            Ok("Turn on MFA.".into())
        }
    }

    #[tokio::test]
    async fn no_api_key_is_503() {
        let response = app(state(Default::default()))
            .oneshot(json_request("POST", "/api/mascot/ask", json!({"question": "What is MFA?"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn empty_question_is_400() {
        let response = app(state(Default::default()))
            .oneshot(json_request("POST", "/api/mascot/ask", json!({"question": "  "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn answers_with_personality() {
        let stub = Arc::new(StubChat::default());
        let state = state(Default::default()).with_chat_client(stub.clone());

        let response = app(state)
            .oneshot(json_request(
                "POST",
                "/api/mascot/ask",
                json!({"question": "What is MFA?", "personality": "serious"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["answer"], "Turn on MFA.");

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen[0].personality, Personality::Serious);
        assert_eq!(seen[0].user, "What is MFA?");
    }

    #[tokio::test]
    async fn upstream_failure_is_502() {
        let stub = Arc::new(StubChat {
            fail: true,
            ..StubChat::default()
        });
        let state = state(Default::default()).with_chat_client(stub);

        let response = app(state)
            .oneshot(json_request(
                "POST",
                "/api/mascot/contextual-tips",
                json!({"context": "Risk Register"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
