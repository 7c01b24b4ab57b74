//! IntakeService - Handles one inbound message for one caller.
//!
//! The per-caller lease is held only while the transition is computed and
//! written. A report commit (with its retries) runs after the lease is
//! released; its outcome is applied back under a second short lease.

use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::foundation::{ConversationId, DeliveryId, ReportId, Timestamp};
use crate::domain::intake::{
    messages, normalize, CategoryCode, ConversationEngine, ConversationSession, ReportDraft,
    Stage, Transition,
};
use crate::ports::{DeliveryRecord, PersistError, ReportSink, SessionStore};

/// One message as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub conversation_id: ConversationId,
    pub delivery_id: DeliveryId,
    pub text: String,
}

/// How an inbound event was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// The conversation moved on without producing a report.
    Advanced,
    /// A repeated delivery; the earlier reply was returned.
    Replayed,
    /// A report was made durable.
    Recorded(ReportId),
    /// The report could not be saved. The caller is back on the description
    /// step unless they already chose another category.
    PersistFailed(PersistError),
}

impl Disposition {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Disposition::Advanced => "advanced",
            Disposition::Replayed => "replayed",
            Disposition::Recorded(_) => "recorded",
            Disposition::PersistFailed(_) => "persist_failed",
        }
    }
}

/// Reply to send back plus what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeOutcome {
    pub reply: String,
    pub disposition: Disposition,
}

impl IntakeOutcome {
    fn new(reply: impl Into<String>, disposition: Disposition) -> Self {
        Self {
            reply: reply.into(),
            disposition,
        }
    }
}

/// Application service behind the messaging webhook.
#[derive(Clone)]
pub struct IntakeService {
    store: Arc<dyn SessionStore>,
    engine: ConversationEngine,
    sink: Arc<dyn ReportSink>,
}

impl IntakeService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        engine: ConversationEngine,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        Self {
            store,
            engine,
            sink,
        }
    }

    /// Handles one delivery. Always produces a reply.
    pub async fn handle(&self, event: InboundEvent) -> IntakeOutcome {
        let InboundEvent {
            conversation_id,
            delivery_id,
            text,
        } = event;

        let mut lease = self.store.lock(&conversation_id).await;

        match lease.delivery(&delivery_id) {
            Some(DeliveryRecord::Completed(reply)) => {
                tracing::debug!(
                    conversation_id = %conversation_id,
                    delivery_id = %delivery_id,
                    "Duplicate delivery, replaying reply"
                );
                return IntakeOutcome::new(reply, Disposition::Replayed);
            }
            Some(DeliveryRecord::InFlight(rx)) => {
                drop(lease);
                return self.await_in_flight(conversation_id, delivery_id, rx).await;
            }
            None => {}
        }

        let now = Timestamp::now();
        let Transition {
            session,
            reply,
            draft,
        } = self
            .engine
            .transition(lease.session(), &normalize(&text), &delivery_id, now);

        let Some(draft) = draft else {
            lease.put(session);
            lease.complete_delivery(delivery_id, reply.clone());
            return IntakeOutcome::new(reply, Disposition::Advanced);
        };

        lease.put(session);
        let pending = PendingCommit {
            revision: lease.revision(),
            publish: lease.begin_delivery(delivery_id.clone()),
            conversation_id,
            delivery_id,
            draft,
            reply,
        };
        drop(lease);

        // Detached so a dropped request cannot strand the in-flight marker.
        let conversation_id = pending.conversation_id.clone();
        let delivery_id = pending.delivery_id.clone();
        let category = pending.draft.category.clone();
        let revision = pending.revision;
        let commit = tokio::spawn(pending.run(self.store.clone(), self.sink.clone()));

        match commit.await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(
                    conversation_id = %conversation_id,
                    delivery_id = %delivery_id,
                    error = %err,
                    "Report commit task failed"
                );
                let reply = reopen_description(
                    self.store.as_ref(),
                    &conversation_id,
                    &delivery_id,
                    &category,
                    revision,
                )
                .await;
                IntakeOutcome::new(
                    reply,
                    Disposition::PersistFailed(PersistError::transient("report commit task failed")),
                )
            }
        }
    }

    async fn await_in_flight(
        &self,
        conversation_id: ConversationId,
        delivery_id: DeliveryId,
        mut rx: watch::Receiver<Option<String>>,
    ) -> IntakeOutcome {
        tracing::debug!(
            conversation_id = %conversation_id,
            delivery_id = %delivery_id,
            "Duplicate delivery while commit in flight, waiting"
        );

        let reply = match rx.wait_for(Option::is_some).await {
            Ok(reply) => (*reply).clone(),
            Err(_) => None,
        };

        match reply {
            Some(reply) => IntakeOutcome::new(reply, Disposition::Replayed),
            None => {
                self.abandon(&conversation_id, &delivery_id).await;
                IntakeOutcome::new(
                    messages::please_try_again(),
                    Disposition::PersistFailed(PersistError::transient("report commit was abandoned")),
                )
            }
        }
    }

    /// Drops a stale in-flight marker so the next retry executes afresh.
    async fn abandon(&self, conversation_id: &ConversationId, delivery_id: &DeliveryId) {
        let mut lease = self.store.lock(conversation_id).await;
        if let Some(DeliveryRecord::InFlight(_)) = lease.delivery(delivery_id) {
            lease.forget_delivery(delivery_id);
        }
    }
}

/// Puts a caller whose report was not saved back on the description step.
///
/// The session is restored unless the caller has since picked a new
/// category, in which case that choice is kept and the reply asks for the
/// lost report to be filed again later. The in-flight marker is dropped so a
/// transport retry re-executes. Returns the apology to send.
async fn reopen_description(
    store: &dyn SessionStore,
    conversation_id: &ConversationId,
    delivery_id: &DeliveryId,
    category: &CategoryCode,
    revision: u64,
) -> String {
    let mut lease = store.lock(conversation_id).await;
    let moved_on = lease.revision() != revision;

    let apology = if moved_on && lease.session().stage() == Stage::AwaitDescription {
        tracing::warn!(
            conversation_id = %conversation_id,
            delivery_id = %delivery_id,
            category = %category,
            "Caller chose a new category before commit failed, keeping it"
        );
        messages::earlier_report_not_saved(category)
    } else {
        if moved_on {
            tracing::warn!(
                conversation_id = %conversation_id,
                delivery_id = %delivery_id,
                "Caller moved on before commit failed, restoring description step"
            );
        }
        lease.put(ConversationSession::awaiting_description(
            conversation_id.clone(),
            category.clone(),
            Timestamp::now(),
        ));
        messages::please_resend(category)
    };

    if let Some(DeliveryRecord::InFlight(_)) = lease.delivery(delivery_id) {
        lease.forget_delivery(delivery_id);
    }
    apology
}

/// A report handed off for commit after its session was reset.
struct PendingCommit {
    conversation_id: ConversationId,
    delivery_id: DeliveryId,
    draft: ReportDraft,
    reply: String,
    revision: u64,
    publish: watch::Sender<Option<String>>,
}

impl PendingCommit {
    async fn run(self, store: Arc<dyn SessionStore>, sink: Arc<dyn ReportSink>) -> IntakeOutcome {
        match sink.commit(&self.draft, &self.delivery_id).await {
            Ok(report_id) => {
                let mut lease = store.lock(&self.conversation_id).await;
                lease.complete_delivery(self.delivery_id.clone(), self.reply.clone());
                drop(lease);
                self.publish.send_replace(Some(self.reply.clone()));

                tracing::info!(
                    conversation_id = %self.conversation_id,
                    delivery_id = %self.delivery_id,
                    report_id = %report_id,
                    category = %self.draft.category,
                    "Report recorded"
                );
                IntakeOutcome::new(self.reply, Disposition::Recorded(report_id))
            }
            Err(err) => {
                if err.is_transient() {
                    tracing::warn!(
                        conversation_id = %self.conversation_id,
                        delivery_id = %self.delivery_id,
                        error = %err,
                        "Report commit failed after retries"
                    );
                } else {
                    tracing::error!(
                        conversation_id = %self.conversation_id,
                        delivery_id = %self.delivery_id,
                        category = %self.draft.category,
                        error = %err,
                        "Report commit rejected"
                    );
                }

                let apology = reopen_description(
                    store.as_ref(),
                    &self.conversation_id,
                    &self.delivery_id,
                    &self.draft.category,
                    self.revision,
                )
                .await;
                self.publish.send_replace(Some(apology.clone()));

                IntakeOutcome::new(apology, Disposition::PersistFailed(err))
            }
        }
    }
}
