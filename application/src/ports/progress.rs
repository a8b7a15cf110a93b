//! Progress notification port
//!
//! Defines the interface for reporting progress while a discussion runs.

use agora_domain::ChainSummary;

/// Callback for progress updates during a discussion
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain lines, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when a round starts dispatching `calls` agent calls over `points` points
    fn on_round_start(&self, round: u32, points: usize, calls: usize);

    /// Called when one agent call finishes; `degraded` marks a sentinel response
    fn on_agent_complete(&self, round: u32, agent: &str, degraded: bool);

    /// Called when a round's completed snapshot has been persisted
    fn on_round_complete(&self, round: u32, summary: &ChainSummary);

    /// Called with the moderator's summary of a round
    fn on_round_summary(&self, _round: u32, _summary: &str) {}

    /// Called once when the session terminates
    fn on_session_terminated(&self, _rounds_completed: u32) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_round_start(&self, _round: u32, _points: usize, _calls: usize) {}
    fn on_agent_complete(&self, _round: u32, _agent: &str, _degraded: bool) {}
    fn on_round_complete(&self, _round: u32, _summary: &ChainSummary) {}
}
