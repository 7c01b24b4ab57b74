//! HTTP DTOs for the messaging webhook.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::DomainError;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Form fields posted by the messaging provider. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookForm {
    /// Sender address, e.g. `whatsapp:+919999999999`.
    #[serde(rename = "From")]
    pub from: Option<String>,

    #[serde(rename = "Body", default)]
    pub body: String,

    /// Provider message id; stable across redeliveries of one message.
    #[serde(rename = "MessageSid", alias = "SmsMessageSid")]
    pub message_sid: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Liveness payload for `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            service: "signal-shield".to_string(),
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, String>>,
}

impl From<DomainError> for ErrorResponse {
    fn from(err: DomainError) -> Self {
        Self {
            code: err.code.to_string(),
            message: err.message,
            details: (!err.details.is_empty()).then_some(err.details),
        }
    }
}

/// TwiML envelope carrying one reply message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagingResponse {
    message: String,
}

impl MessagingResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn to_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><Response><Message>{}</Message></Response>"#,
            quick_xml::escape::escape(self.message.as_str())
        )
    }
}
