//! Report drafts handed to the persistence boundary.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, Timestamp};

use super::CategoryCode;

/// A completed, not yet durable fraud report.
///
/// Produced once per finished conversation cycle; only a `ReportSink`
/// turns it into a durable record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDraft {
    pub conversation_id: ConversationId,
    pub category: CategoryCode,
    /// Caller's text, verbatim after trimming. May be empty.
    pub description: String,
    pub occurred_at: Timestamp,
}
