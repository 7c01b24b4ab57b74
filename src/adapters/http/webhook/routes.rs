//! HTTP routes for the messaging webhook.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{health, receive_message, WebhookHandlers};

/// Creates the webhook router: `GET /` and `POST /whatsapp`.
pub fn webhook_routes(handlers: WebhookHandlers) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/whatsapp", post(receive_message))
        .with_state(handlers)
}
