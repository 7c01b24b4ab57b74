//! Report persistence retry configuration

use serde::Deserialize;
use std::time::Duration;

use crate::adapters::reports::RetryPolicy;

use super::error::ValidationError;

/// Bounds on retrying a report commit
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,

    /// Limit on a single commit attempt
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_ms: u64,
}

impl PersistenceConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            attempt_timeout: Duration::from_millis(self.attempt_timeout_ms),
        }
    }

    /// Worst case time spent on one commit, including backoff.
    pub fn worst_case(&self) -> Duration {
        let policy = self.retry_policy();
        (1..self.max_attempts).fold(
            policy.attempt_timeout * self.max_attempts,
            |total, attempt| total + policy.backoff_after(attempt),
        )
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_attempts == 0 {
            return Err(ValidationError::MustBePositive("persistence.max_attempts"));
        }
        if self.attempt_timeout_ms == 0 {
            return Err(ValidationError::MustBePositive("persistence.attempt_timeout_ms"));
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(ValidationError::InvalidBackoff);
        }
        Ok(())
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            attempt_timeout_ms: default_attempt_timeout(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff() -> u64 {
    200
}

fn default_max_backoff() -> u64 {
    2_000
}

fn default_attempt_timeout() -> u64 {
    2_000
}
