//! Discussion parameters - round loop control.
//!
//! [`DiscussionParams`] groups the static parameters that control the round
//! loop in [`Orchestrator`](crate::use_cases::orchestrator::Orchestrator).
//! These are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Round loop control parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionParams {
    /// Last round to run; the session terminates after it completes.
    pub max_rounds: u32,
    /// Informational round length reported by `get_remaining_time`.
    pub round_duration: Duration,
    /// Maximum generated questions seeded into the next round.
    pub next_points_limit: usize,
    /// Attempts to durably write a completed snapshot before giving up.
    pub persist_attempts: u32,
    /// Backoff before the second persistence attempt; doubles afterwards.
    pub persist_backoff: Duration,
    /// Wait before a non-durable round's snapshot is written again.
    pub persist_recovery_delay: Duration,
}

impl Default for DiscussionParams {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            round_duration: Duration::from_secs(180),
            next_points_limit: 3,
            persist_attempts: 3,
            persist_backoff: Duration::from_millis(500),
            persist_recovery_delay: Duration::from_secs(5),
        }
    }
}

impl DiscussionParams {
    // ==================== Builder Methods ====================

    pub fn with_max_rounds(mut self, max: u32) -> Self {
        self.max_rounds = max;
        self
    }

    pub fn with_round_duration(mut self, duration: Duration) -> Self {
        self.round_duration = duration;
        self
    }

    pub fn with_next_points_limit(mut self, limit: usize) -> Self {
        self.next_points_limit = limit;
        self
    }

    pub fn with_persist_attempts(mut self, attempts: u32) -> Self {
        self.persist_attempts = attempts;
        self
    }

    pub fn with_persist_backoff(mut self, backoff: Duration) -> Self {
        self.persist_backoff = backoff;
        self
    }

    pub fn with_persist_recovery_delay(mut self, delay: Duration) -> Self {
        self.persist_recovery_delay = delay;
        self
    }
}
