//! Retrying report sink - Bounded retries with backoff around any sink.
//!
//! Each attempt runs under a timeout; a timed-out attempt counts as a
//! transient failure. Permanent failures are returned immediately.
//!
//! # Example
//!
//! ```ignore
//! let sink = RetryingReportSink::new(PostgresReportSink::new(pool), RetryPolicy::default());
//! ```

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::domain::foundation::{DeliveryId, ReportId};
use crate::domain::intake::ReportDraft;
use crate::ports::{PersistError, ReportSink};

/// How hard to try before giving up on a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. At least 1.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for each later attempt.
    pub initial_backoff: Duration,
    /// Upper bound on any single delay.
    pub max_backoff: Duration,
    /// Limit on a single attempt.
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-based).
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
            attempt_timeout: Duration::from_secs(2),
        }
    }
}

/// Decorates a [`ReportSink`] with bounded retries.
pub struct RetryingReportSink<S: ReportSink> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: ReportSink> RetryingReportSink<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<S: ReportSink> ReportSink for RetryingReportSink<S> {
    async fn commit(
        &self,
        draft: &ReportDraft,
        delivery_id: &DeliveryId,
    ) -> Result<ReportId, PersistError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let result = match timeout(
                self.policy.attempt_timeout,
                self.inner.commit(draft, delivery_id),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(PersistError::Timeout(self.policy.attempt_timeout)),
            };

            let err = match result {
                Ok(report_id) => return Ok(report_id),
                Err(err) => err,
            };

            if !err.is_transient() || attempt >= max_attempts {
                return Err(err);
            }

            let delay = self.policy.backoff_after(attempt);
            tracing::warn!(
                conversation_id = %draft.conversation_id,
                delivery_id = %delivery_id,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Report commit failed, retrying"
            );
            sleep(delay).await;
            attempt += 1;
        }
    }
}
