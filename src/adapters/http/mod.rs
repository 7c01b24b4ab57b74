//! HTTP adapters - Inbound transport endpoints.
//!
//! - `webhook` - Messaging provider webhook and health check

pub mod webhook;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::application::intake::IntakeService;

pub use webhook::{webhook_routes, WebhookHandlers};

/// Full application router with tracing and a per-request timeout.
pub fn app_router(intake: Arc<IntakeService>, request_timeout: Duration) -> Router {
    webhook_routes(WebhookHandlers::new(intake)).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(request_timeout)),
    )
}
