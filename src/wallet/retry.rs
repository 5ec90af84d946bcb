//! Bounded retry policy for wallet auto-connect.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How many times to try connecting and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,

    /// Delays (milliseconds) before the 2nd, 3rd, ... attempt. The last
    /// entry repeats when there are more attempts than entries.
    pub backoff_ms: Vec<u64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: vec![500, 1000, 2000],
        }
    }
}

impl RetryPolicy {
    /// A policy that tries exactly once.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            backoff_ms: Vec::new(),
        }
    }

    /// Delay before attempt number `attempt` (1-based). No delay before the first.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 || self.backoff_ms.is_empty() {
            return Duration::ZERO;
        }
        let index = ((attempt - 2) as usize).min(self.backoff_ms.len() - 1);
        Duration::from_millis(self.backoff_ms[index])
    }

    /// Whether another attempt is allowed after `attempts_made`.
    pub fn allows_another(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }
}
