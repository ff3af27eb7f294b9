//! Marketing-site forms. Submissions are logged; there is no other sink.

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::extractors::ApiJson;
use crate::models::{ContactMessage, ContactRequest, DemoBooking, DemoRequest};

#[derive(Debug, Serialize)]
pub struct FormAck {
    pub success: bool,
    pub message: &'static str,
}

/// POST /api/contact
async fn contact(
    ApiJson(req): ApiJson<ContactRequest>,
) -> Result<(StatusCode, Json<FormAck>), ApiError> {
    let msg = ContactMessage::try_from(req)?;
    tracing::info!(
        target: "forms",
        name = %msg.name,
        email = %msg.email,
        message = %msg.message,
        "contact form submitted"
    );
    Ok((
        StatusCode::OK,
        Json(FormAck {
            success: true,
            message: "Contact form submitted successfully",
        }),
    ))
}

/// POST /api/book-demo
async fn book_demo(
    ApiJson(req): ApiJson<DemoRequest>,
) -> Result<(StatusCode, Json<FormAck>), ApiError> {
    let booking = DemoBooking::try_from(req)?;
    tracing::info!(
        target: "forms",
        name = %booking.name,
        email = %booking.email,
        company = booking.company.as_deref().unwrap_or("Not provided"),
        message = booking.message.as_deref().unwrap_or("Not provided"),
        "demo requested"
    );
    Ok((
        StatusCode::OK,
        Json(FormAck {
            success: true,
            message: "Demo request submitted successfully",
        }),
    ))
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/api/contact", post(contact))
        .route("/api/book-demo", post(book_demo))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, body_json, json_request, state};
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn contact_accepted_without_session() {
        let response = app(state(Default::default()))
            .oneshot(json_request(
                "POST",
                "/api/contact",
                json!({"name": "Sara", "email": "sara@example.com", "message": "Hello"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Contact form submitted successfully");
    }

    #[tokio::test]
    async fn contact_rejects_bad_email() {
        let response = app(state(Default::default()))
            .oneshot(json_request(
                "POST",
                "/api/contact",
                json!({"name": "Sara", "email": "not-an-email", "message": "Hello"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "validation_error");
    }

    #[tokio::test]
    async fn demo_requires_name() {
        let response = app(state(Default::default()))
            .oneshot(json_request(
                "POST",
                "/api/book-demo",
                json!({"email": "sara@example.com"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn demo_accepts_optional_fields() {
        let response = app(state(Default::default()))
            .oneshot(json_request(
                "POST",
                "/api/book-demo",
                json!({"name": "Sara", "email": "sara@example.com", "company": "Acme"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
