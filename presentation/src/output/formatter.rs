//! Output formatter trait

use agora_application::DiscussionOutcome;
use agora_domain::DiscussionPoint;
use serde::Serialize;

/// Everything rendered after a session ends
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DiscussionReport<'a> {
    pub topic: &'a str,
    pub outcome: &'a DiscussionOutcome,
    /// Every point of the chain, in creation order
    pub points: &'a [DiscussionPoint],
}

/// Trait for formatting discussion results
pub trait OutputFormatter {
    /// Format every point and the moderator summary
    fn format(&self, report: &DiscussionReport<'_>) -> String;

    /// Format as JSON
    fn format_json(&self, report: &DiscussionReport<'_>) -> String;

    /// Format the conclusions only (concise output)
    fn format_summary_only(&self, report: &DiscussionReport<'_>) -> String;
}
