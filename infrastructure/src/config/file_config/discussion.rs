//! Round loop configuration from TOML (`[discussion]` section)

use agora_application::DiscussionParams;
use agora_domain::agent::validation::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw discussion configuration from TOML
///
/// # Example
///
/// ```toml
/// [discussion]
/// max_rounds = 5
/// round_duration_secs = 120
/// snapshot_dir = "discussions"
/// next_points_limit = 3
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDiscussionConfig {
    /// Last round to run
    pub max_rounds: u32,
    /// Informational round length in seconds
    pub round_duration_secs: u64,
    /// Directory receiving `round_<N>.json` snapshots
    pub snapshot_dir: String,
    /// Generated questions seeded into the next round (1..=5)
    pub next_points_limit: usize,
    /// Attempts to write a completed snapshot
    pub persist_attempts: u32,
    /// Backoff before the second snapshot write attempt, in milliseconds
    pub persist_backoff_ms: u64,
    /// Wait before retrying a round whose snapshot could not be written
    pub persist_recovery_secs: u64,
}

impl Default for FileDiscussionConfig {
    fn default() -> Self {
        let params = DiscussionParams::default();
        Self {
            max_rounds: params.max_rounds,
            round_duration_secs: params.round_duration.as_secs(),
            snapshot_dir: "discussions".to_string(),
            next_points_limit: params.next_points_limit,
            persist_attempts: params.persist_attempts,
            persist_backoff_ms: params.persist_backoff.as_millis() as u64,
            persist_recovery_secs: params.persist_recovery_delay.as_secs(),
        }
    }
}

impl FileDiscussionConfig {
    pub fn to_params(&self) -> DiscussionParams {
        DiscussionParams::default()
            .with_max_rounds(self.max_rounds)
            .with_round_duration(Duration::from_secs(self.round_duration_secs))
            .with_next_points_limit(self.next_points_limit)
            .with_persist_attempts(self.persist_attempts)
            .with_persist_backoff(Duration::from_millis(self.persist_backoff_ms))
            .with_persist_recovery_delay(Duration::from_secs(self.persist_recovery_secs))
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.max_rounds == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroRounds,
                "discussion.max_rounds must be at least 1",
            ));
        }
        if self.persist_attempts == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroAttempts {
                    field: "discussion.persist_attempts".to_string(),
                },
                "discussion.persist_attempts must be at least 1",
            ));
        }
        if !(1..=5).contains(&self.next_points_limit) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::NextPointsLimitOutOfRange {
                    value: self.next_points_limit,
                },
                format!(
                    "discussion.next_points_limit must be between 1 and 5, got {}",
                    self.next_points_limit
                ),
            ));
        }
        if self.round_duration_secs == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroRoundDuration,
                "discussion.round_duration_secs is 0; remaining time will always be 0",
            ));
        }

        issues
    }
}
