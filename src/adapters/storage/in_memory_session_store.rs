//! In-Memory Session Store Adapter
//!
//! Keeps conversation records in a sharded lock table. Each caller's record
//! sits behind its own async mutex; the shard locks are only held long
//! enough to find or insert that mutex, so callers in different (or even
//! the same) shard never wait on each other's transitions.
//!
//! Suitable for a single instance. Multi-instance deployments need an
//! external keyed store implementing the same port.

use async_trait::async_trait;
use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

use crate::domain::foundation::{ConversationId, Timestamp};
use crate::domain::intake::ConversationSession;
use crate::ports::{ConversationRecord, SessionLease, SessionStore};

type Shard = RwLock<HashMap<ConversationId, Arc<Mutex<ConversationRecord>>>>;

/// Sharded in-memory session store.
#[derive(Debug)]
pub struct InMemorySessionStore {
    shards: Box<[Shard]>,
    hasher: RandomState,
    delivery_capacity: usize,
}

impl InMemorySessionStore {
    pub const DEFAULT_SHARDS: usize = 64;
    pub const DEFAULT_DELIVERY_CAPACITY: usize = 32;

    /// Create a store with `shard_count` shards, remembering up to
    /// `delivery_capacity` deliveries per caller.
    pub fn new(shard_count: usize, delivery_capacity: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| RwLock::new(HashMap::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            shards,
            hasher: RandomState::new(),
            delivery_capacity,
        }
    }

    fn shard(&self, conversation_id: &ConversationId) -> &Shard {
        let index = (self.hasher.hash_one(conversation_id) % self.shards.len() as u64) as usize;
        &self.shards[index]
    }

    async fn entry(&self, conversation_id: &ConversationId) -> Arc<Mutex<ConversationRecord>> {
        let shard = self.shard(conversation_id);

        if let Some(entry) = shard.read().await.get(conversation_id) {
            return entry.clone();
        }

        let mut records = shard.write().await;
        records
            .entry(conversation_id.clone())
            .or_insert_with(|| {
                Arc::new(Mutex::new(ConversationRecord::new(
                    conversation_id.clone(),
                    self.delivery_capacity,
                    Timestamp::now(),
                )))
            })
            .clone()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SHARDS, Self::DEFAULT_DELIVERY_CAPACITY)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, conversation_id: &ConversationId) -> ConversationSession {
        let existing = self.shard(conversation_id).read().await.get(conversation_id).cloned();

        match existing {
            Some(entry) => entry.lock().await.session().clone(),
            None => ConversationSession::default_for(conversation_id.clone(), Timestamp::now()),
        }
    }

    async fn put(&self, conversation_id: &ConversationId, session: ConversationSession) {
        self.lock(conversation_id).await.put(session);
    }

    async fn lock(&self, conversation_id: &ConversationId) -> SessionLease {
        let entry = self.entry(conversation_id).await;
        SessionLease::new(entry.lock_owned().await)
    }

    async fn evict_idle(&self, idle_for: Duration) -> usize {
        let cutoff = Timestamp::now().minus(idle_for);
        let mut evicted = 0;

        for shard in self.shards.iter() {
            let mut records = shard.write().await;
            records.retain(|_, entry| {
                // Anyone holding or waiting on this record has a clone of the Arc.
                if Arc::strong_count(entry) > 1 {
                    return true;
                }
                let Ok(record) = entry.try_lock() else {
                    return true;
                };
                let idle = record.last_activity().is_before(&cutoff) && !record.has_in_flight();
                if idle {
                    evicted += 1;
                }
                !idle
            });
        }

        if evicted > 0 {
            tracing::debug!(evicted, idle_secs = idle_for.as_secs(), "Evicted idle conversations");
        }

        evicted
    }

    async fn len(&self) -> usize {
        let mut total = 0;
        for shard in self.shards.iter() {
            total += shard.read().await.len();
        }
        total
    }
}
