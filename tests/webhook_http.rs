//! Integration tests for the webhook HTTP surface.
//!
//! Requests are driven through the full router with `tower::ServiceExt`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use signal_shield::adapters::http::app_router;
use signal_shield::adapters::http::webhook::{ErrorResponse, HealthResponse};
use signal_shield::adapters::{
    InMemoryReportSink, InMemorySessionStore, RetryPolicy, RetryingReportSink,
};
use signal_shield::application::IntakeService;
use signal_shield::domain::foundation::{ConversationId, DeliveryId, ReportId};
use signal_shield::domain::intake::{CategoryRegistry, ConversationEngine, ReportDraft, Stage};
use signal_shield::ports::{PersistError, ReportSink, SessionStore};

fn app(sink: InMemoryReportSink) -> Router {
    let service = IntakeService::new(
        Arc::new(InMemorySessionStore::default()),
        ConversationEngine::new(Arc::new(CategoryRegistry::standard().unwrap())),
        Arc::new(sink),
    );
    app_router(Arc::new(service), Duration::from_secs(5))
}

fn form_post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/whatsapp")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn health_check_reports_ok() {
    let response = app(InMemoryReportSink::new())
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(health, HealthResponse::ok());
}

#[tokio::test]
async fn first_message_returns_twiml_greeting() {
    let response = app(InMemoryReportSink::new())
        .oneshot(form_post("From=whatsapp%3A%2B91999&Body=hi&MessageSid=SM1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/xml"
    );
    let xml = body_text(response).await;
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("<Response><Message>🛡️ SignalShield Alert System"));
    assert!(xml.ends_with("</Message></Response>"));
}

#[tokio::test]
async fn full_conversation_over_http_stores_one_report() {
    let sink = InMemoryReportSink::new();
    let app = app(sink.clone());

    let steps = [
        "From=whatsapp%3A%2B91999&Body=hi&MessageSid=SM1",
        "From=whatsapp%3A%2B91999&Body=3&MessageSid=SM2",
        "From=whatsapp%3A%2B91999&Body=Asked+for+my+OTP&MessageSid=SM3",
        // Provider redelivery of the last message.
        "From=whatsapp%3A%2B91999&Body=Asked+for+my+OTP&MessageSid=SM3",
    ];

    let mut replies = Vec::new();
    for step in steps {
        let response = app.clone().oneshot(form_post(step)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        replies.push(body_text(response).await);
    }

    assert!(replies[1].contains("Category selected: *ACCOUNT*"));
    assert!(replies[2].contains("We&apos;ve recorded it under: *ACCOUNT*"));
    assert_eq!(replies[3], replies[2]);
    let reports = sink.reports().await;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].draft.description, "Asked for my OTP");
    assert_eq!(reports[0].draft.conversation_id.as_str(), "whatsapp:+91999");
}

#[tokio::test]
async fn missing_sender_is_bad_request() {
    let response = app(InMemoryReportSink::new())
        .oneshot(form_post("Body=hi&MessageSid=SM1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(error.code, "EMPTY_FIELD");
}

#[tokio::test]
async fn missing_message_sid_is_still_answered() {
    let response = app(InMemoryReportSink::new())
        .oneshot(form_post("From=%2B1&Body=hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("SignalShield Alert System"));
}

/// A database that accepts connections but never answers.
struct StalledSink;

#[async_trait]
impl ReportSink for StalledSink {
    async fn commit(
        &self,
        _draft: &ReportDraft,
        _delivery_id: &DeliveryId,
    ) -> Result<ReportId, PersistError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(ReportId::new())
    }
}

#[tokio::test]
async fn stalled_database_still_gets_an_apology_before_request_timeout() {
    let store = Arc::new(InMemorySessionStore::default());
    let sink = RetryingReportSink::new(
        StalledSink,
        RetryPolicy {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(10),
            attempt_timeout: Duration::from_millis(50),
        },
    );
    let service = IntakeService::new(
        store.clone(),
        ConversationEngine::new(Arc::new(CategoryRegistry::standard().unwrap())),
        Arc::new(sink),
    );
    let app = app_router(Arc::new(service), Duration::from_secs(2));

    for step in [
        "From=whatsapp%3A%2B91888&Body=hi&MessageSid=SM1",
        "From=whatsapp%3A%2B91888&Body=3&MessageSid=SM2",
    ] {
        let response = app.clone().oneshot(form_post(step)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(form_post(
            "From=whatsapp%3A%2B91888&Body=Asked+for+my+OTP&MessageSid=SM3",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let xml = body_text(response).await;
    assert!(xml.contains("couldn&apos;t save your *ACCOUNT* report"));
    assert!(xml.contains("Please send your description again"));

    let session = store
        .get(&ConversationId::new("whatsapp:+91888").unwrap())
        .await;
    assert_eq!(session.stage(), Stage::AwaitDescription);
}
