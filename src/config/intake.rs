//! Conversation intake configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Session store sizing and idle eviction
#[derive(Debug, Clone, Deserialize)]
pub struct IntakeConfig {
    /// A conversation quiet for this long is forgotten
    #[serde(default = "default_session_idle_ttl")]
    pub session_idle_ttl_secs: u64,

    /// How often the idle sweep runs
    #[serde(default = "default_eviction_interval")]
    pub eviction_interval_secs: u64,

    /// Recent deliveries remembered per caller for duplicate detection
    #[serde(default = "default_deliveries_per_conversation")]
    pub deliveries_per_conversation: usize,

    /// Lock table shards in the in-memory session store
    #[serde(default = "default_shard_count")]
    pub shard_count: usize,
}

impl IntakeConfig {
    pub fn session_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session_idle_ttl_secs)
    }

    pub fn eviction_interval(&self) -> Duration {
        Duration::from_secs(self.eviction_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.session_idle_ttl_secs == 0 {
            return Err(ValidationError::MustBePositive("intake.session_idle_ttl_secs"));
        }
        if self.eviction_interval_secs == 0 {
            return Err(ValidationError::MustBePositive("intake.eviction_interval_secs"));
        }
        if self.deliveries_per_conversation == 0 {
            return Err(ValidationError::MustBePositive(
                "intake.deliveries_per_conversation",
            ));
        }
        if self.shard_count == 0 {
            return Err(ValidationError::MustBePositive("intake.shard_count"));
        }
        Ok(())
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            session_idle_ttl_secs: default_session_idle_ttl(),
            eviction_interval_secs: default_eviction_interval(),
            deliveries_per_conversation: default_deliveries_per_conversation(),
            shard_count: default_shard_count(),
        }
    }
}

fn default_session_idle_ttl() -> u64 {
    24 * 60 * 60
}

fn default_eviction_interval() -> u64 {
    300
}

fn default_deliveries_per_conversation() -> usize {
    32
}

fn default_shard_count() -> usize {
    64
}
