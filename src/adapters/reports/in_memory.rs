//! In-memory report sink for tests and local development.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{ConversationId, DeliveryId, ReportId};
use crate::domain::intake::ReportDraft;
use crate::ports::{PersistError, ReportSink};

/// A committed report as held by [`InMemoryReportSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReport {
    pub id: ReportId,
    pub delivery_id: DeliveryId,
    pub draft: ReportDraft,
}

#[derive(Debug, Default)]
struct Inner {
    by_submission: HashMap<(ConversationId, DeliveryId), ReportId>,
    reports: Vec<StoredReport>,
    scripted_failures: VecDeque<PersistError>,
    attempts: usize,
}

/// Report sink keeping records in memory, keyed by submission.
///
/// Failures can be scripted with [`InMemoryReportSink::fail_next`] to
/// exercise retry and recovery paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReportSink {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an error to be returned by an upcoming `commit` call.
    pub async fn fail_next(&self, error: PersistError) {
        self.inner.write().await.scripted_failures.push_back(error);
    }

    /// All durable reports in commit order.
    pub async fn reports(&self) -> Vec<StoredReport> {
        self.inner.read().await.reports.clone()
    }

    pub async fn report_count(&self) -> usize {
        self.inner.read().await.reports.len()
    }

    /// Number of `commit` calls seen, including failed ones.
    pub async fn attempts(&self) -> usize {
        self.inner.read().await.attempts
    }
}

#[async_trait]
impl ReportSink for InMemoryReportSink {
    async fn commit(
        &self,
        draft: &ReportDraft,
        delivery_id: &DeliveryId,
    ) -> Result<ReportId, PersistError> {
        let mut inner = self.inner.write().await;
        inner.attempts += 1;

        if let Some(error) = inner.scripted_failures.pop_front() {
            return Err(error);
        }

        let key = (draft.conversation_id.clone(), delivery_id.clone());
        if let Some(existing) = inner.by_submission.get(&key) {
            return Ok(*existing);
        }

        let id = ReportId::new();
        inner.by_submission.insert(key, id);
        inner.reports.push(StoredReport {
            id,
            delivery_id: delivery_id.clone(),
            draft: draft.clone(),
        });

        Ok(id)
    }
}
