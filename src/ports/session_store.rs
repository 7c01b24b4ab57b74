//! SessionStore port - Per-caller conversation state.
//!
//! ## Concurrency Contract
//!
//! - Operations on the **same** conversation are linearizable. A
//!   [`SessionLease`] is an exclusive hold on one caller's record, so
//!   read → transition → write cannot interleave with another delivery
//!   for that caller.
//! - Operations on **different** conversations never wait on each other
//!   beyond a brief table lookup. There is no lock guarding the whole table
//!   for the duration of a transition.
//!
//! ## Delivery Memory
//!
//! Each record remembers the outcome of its most recent deliveries so a
//! transport retry is answered with the reply computed the first time.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{watch, OwnedMutexGuard};

use crate::domain::foundation::{ConversationId, DeliveryId, Timestamp};
use crate::domain::intake::ConversationSession;

/// What is known about one delivery of an inbound event.
#[derive(Debug, Clone)]
pub enum DeliveryRecord {
    /// A report commit for this delivery is still running. The receiver
    /// yields the final reply once it is known.
    InFlight(watch::Receiver<Option<String>>),

    /// Fully handled; replay this reply.
    Completed(String),
}

/// Everything stored for one caller.
#[derive(Debug)]
pub struct ConversationRecord {
    session: ConversationSession,
    revision: u64,
    deliveries: VecDeque<(DeliveryId, DeliveryRecord)>,
    delivery_capacity: usize,
    last_activity: Timestamp,
}

impl ConversationRecord {
    /// Record for a caller never seen before.
    pub fn new(conversation_id: ConversationId, delivery_capacity: usize, now: Timestamp) -> Self {
        Self {
            session: ConversationSession::default_for(conversation_id, now),
            revision: 0,
            deliveries: VecDeque::with_capacity(delivery_capacity.min(64)),
            delivery_capacity: delivery_capacity.max(1),
            last_activity: now,
        }
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    pub fn last_activity(&self) -> Timestamp {
        self.last_activity
    }

    /// True while some delivery is waiting on a report commit.
    pub fn has_in_flight(&self) -> bool {
        self.deliveries
            .iter()
            .any(|(_, record)| matches!(record, DeliveryRecord::InFlight(_)))
    }

    fn put(&mut self, session: ConversationSession) {
        self.last_activity = session.updated_at();
        self.session = session;
        self.revision += 1;
    }

    fn remember(&mut self, delivery_id: DeliveryId, record: DeliveryRecord) {
        self.deliveries.retain(|(id, _)| *id != delivery_id);
        self.deliveries.push_back((delivery_id, record));
        while self.deliveries.len() > self.delivery_capacity {
            // Oldest completed entries go first; in-flight ones are kept so
            // a concurrent retry still finds them.
            match self
                .deliveries
                .iter()
                .position(|(_, record)| matches!(record, DeliveryRecord::Completed(_)))
            {
                Some(index) => {
                    self.deliveries.remove(index);
                }
                None => break,
            }
        }
    }
}

/// Exclusive hold on one caller's record. Dropping it releases the caller.
#[derive(Debug)]
pub struct SessionLease {
    guard: OwnedMutexGuard<ConversationRecord>,
}

impl SessionLease {
    pub fn new(guard: OwnedMutexGuard<ConversationRecord>) -> Self {
        Self { guard }
    }

    pub fn session(&self) -> &ConversationSession {
        self.guard.session()
    }

    /// Incremented by every `put`; used to detect that a caller moved on.
    pub fn revision(&self) -> u64 {
        self.guard.revision
    }

    pub fn put(&mut self, session: ConversationSession) {
        self.guard.put(session);
    }

    pub fn delivery(&self, delivery_id: &DeliveryId) -> Option<DeliveryRecord> {
        self.guard
            .deliveries
            .iter()
            .find(|(id, _)| id == delivery_id)
            .map(|(_, record)| record.clone())
    }

    /// Marks a delivery as waiting on a commit. The returned sender
    /// publishes the final reply to any retry that arrives meanwhile.
    pub fn begin_delivery(&mut self, delivery_id: DeliveryId) -> watch::Sender<Option<String>> {
        let (tx, rx) = watch::channel(None);
        self.guard.remember(delivery_id, DeliveryRecord::InFlight(rx));
        tx
    }

    pub fn complete_delivery(&mut self, delivery_id: DeliveryId, reply: impl Into<String>) {
        self.guard
            .remember(delivery_id, DeliveryRecord::Completed(reply.into()));
    }

    /// Drops any memory of a delivery so a retry re-executes it.
    pub fn forget_delivery(&mut self, delivery_id: &DeliveryId) {
        self.guard.deliveries.retain(|(id, _)| id != delivery_id);
    }
}

/// Port for per-caller session state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Snapshot of a caller's session; the default `Start` session for an
    /// unseen caller. Never fails.
    async fn get(&self, conversation_id: &ConversationId) -> ConversationSession;

    /// Replaces a caller's session.
    async fn put(&self, conversation_id: &ConversationId, session: ConversationSession);

    /// Waits for exclusive access to a caller's record, creating it if needed.
    async fn lock(&self, conversation_id: &ConversationId) -> SessionLease;

    /// Removes callers idle for longer than `idle_for` that are not locked
    /// and have no commit in flight. Returns the number removed.
    async fn evict_idle(&self, idle_for: Duration) -> usize;

    /// Number of callers currently held.
    async fn len(&self) -> usize;
}
