//! Messaging webhook HTTP adapter.
//!
//! Accepts provider form posts and answers each with a TwiML reply.

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, HealthResponse, MessagingResponse, WebhookForm};
pub use handlers::{health, receive_message, WebhookHandlers};
pub use routes::webhook_routes;
