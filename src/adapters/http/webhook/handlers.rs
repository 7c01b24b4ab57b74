//! HTTP handlers for the messaging webhook.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};

use crate::application::intake::{InboundEvent, IntakeService};
use crate::domain::foundation::{ConversationId, DeliveryId, DomainError};

use super::dto::{ErrorResponse, HealthResponse, MessagingResponse, WebhookForm};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct WebhookHandlers {
    intake: Arc<IntakeService>,
}

impl WebhookHandlers {
    pub fn new(intake: Arc<IntakeService>) -> Self {
        Self { intake }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET / - Liveness check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// POST /whatsapp - Inbound message from the messaging provider
pub async fn receive_message(
    State(handlers): State<WebhookHandlers>,
    Form(form): Form<WebhookForm>,
) -> Response {
    let event = match inbound_event(form) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected webhook request");
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse::from(e))).into_response();
        }
    };

    let conversation_id = event.conversation_id.clone();
    let delivery_id = event.delivery_id.clone();
    let outcome = handlers.intake.handle(event).await;

    tracing::info!(
        conversation_id = %conversation_id,
        delivery_id = %delivery_id,
        disposition = outcome.disposition.kind(),
        "Webhook message handled"
    );

    twiml(MessagingResponse::new(outcome.reply))
}

fn inbound_event(form: WebhookForm) -> Result<InboundEvent, DomainError> {
    let conversation_id = ConversationId::new(form.from.unwrap_or_default())?;

    let delivery_id = match form.message_sid.filter(|sid| !sid.trim().is_empty()) {
        Some(sid) => DeliveryId::new(sid)?,
        None => {
            let generated = DeliveryId::generate();
            tracing::warn!(
                conversation_id = %conversation_id,
                delivery_id = %generated,
                "Webhook request without MessageSid, duplicate detection disabled"
            );
            generated
        }
    };

    Ok(InboundEvent {
        conversation_id,
        delivery_id,
        text: form.body,
    })
}

fn twiml(response: MessagingResponse) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml")],
        response.to_xml(),
    )
        .into_response()
}
