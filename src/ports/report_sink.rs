//! ReportSink port - Durable persistence of completed reports.
//!
//! ## Idempotency
//!
//! Transports retry, and so does the commit path itself. Implementations
//! MUST treat `(conversation_id, delivery_id)` as the identity of a logical
//! submission: committing the same pair again returns the original
//! [`ReportId`] and never creates a second durable record.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{DeliveryId, DomainError, ErrorCode, ReportId};
use crate::domain::intake::ReportDraft;

/// Why a report could not be made durable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    /// Network, pool exhaustion, or similar. Worth retrying.
    #[error("Transient persistence failure: {0}")]
    Transient(String),

    /// The attempt did not finish in time. Treated as transient.
    #[error("Persistence attempt timed out after {0:?}")]
    Timeout(Duration),

    /// Retrying will not help (constraint violation, bad schema, ...).
    #[error("Permanent persistence failure: {0}")]
    Permanent(String),
}

impl PersistError {
    pub fn transient(message: impl Into<String>) -> Self {
        PersistError::Transient(message.into())
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        PersistError::Permanent(message.into())
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, PersistError::Transient(_) | PersistError::Timeout(_))
    }
}

impl From<PersistError> for DomainError {
    fn from(err: PersistError) -> Self {
        let kind = if err.is_transient() { "transient" } else { "permanent" };
        DomainError::new(ErrorCode::PersistenceFailed, err.to_string()).with_detail("kind", kind)
    }
}

/// Port for committing report drafts.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Persists `draft` at most once per `(draft.conversation_id, delivery_id)`.
    async fn commit(
        &self,
        draft: &ReportDraft,
        delivery_id: &DeliveryId,
    ) -> Result<ReportId, PersistError>;
}
