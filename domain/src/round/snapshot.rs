//! Round snapshot - the durable per-round record of chain state

use crate::discussion::chain::DiscussionChain;
use crate::discussion::point::DiscussionPoint;
use crate::discussion::response::AgentResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether the snapshot describes a round still being processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundStatus {
    Ongoing,
    Completed,
}

impl RoundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundStatus::Ongoing => "ongoing",
            RoundStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A raw response as recorded in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// Name of the responding agent
    pub model: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&AgentResponse> for ResponseRecord {
    fn from(response: &AgentResponse) -> Self {
        Self {
            model: response.author.clone(),
            content: response.content.clone(),
            timestamp: response.timestamp,
        }
    }
}

/// Point-in-time view of round `round_num`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub round_num: u32,
    pub timestamp: DateTime<Utc>,
    pub points: Vec<DiscussionPoint>,
    pub responses: Vec<ResponseRecord>,
    /// Live round counter when the snapshot was taken; never below `round_num`
    pub current_round: u32,
    pub status: RoundStatus,
}

impl RoundSnapshot {
    /// Capture the chain for `round_num`
    pub fn capture(
        round_num: u32,
        current_round: u32,
        chain: &DiscussionChain,
        responses: &[AgentResponse],
        status: RoundStatus,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            round_num,
            timestamp,
            points: chain.points().to_vec(),
            responses: responses.iter().map(ResponseRecord::from).collect(),
            current_round: current_round.max(round_num),
            status,
        }
    }

    /// File name under which the snapshot of `round_num` is stored
    pub fn file_name(round_num: u32) -> String {
        format!("round_{round_num}.json")
    }

    pub fn is_completed(&self) -> bool {
        self.status == RoundStatus::Completed
    }

    /// Points introduced in this round
    pub fn points_of_round(&self) -> impl Iterator<Item = &DiscussionPoint> {
        self.points.iter().filter(move |p| p.round_num() == self.round_num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::topic::Topic;

    fn chain() -> DiscussionChain {
        DiscussionChain::new(&Topic::new("Is ethics universal?").unwrap())
    }

    #[test]
    fn test_current_round_never_below_round_num() {
        let snapshot =
            RoundSnapshot::capture(4, 2, &chain(), &[], RoundStatus::Ongoing, Utc::now());
        assert_eq!(snapshot.round_num, 4);
        assert_eq!(snapshot.current_round, 4);
    }

    #[test]
    fn test_serialized_shape() {
        let responses = vec![AgentResponse::new("GPT", "I agree, ethics is universal", 1, Utc::now())];
        let snapshot =
            RoundSnapshot::capture(1, 1, &chain(), &responses, RoundStatus::Completed, Utc::now());

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["round_num"], 1);
        assert_eq!(json["current_round"], 1);
        assert_eq!(json["status"], "completed");
        assert_eq!(json["responses"][0]["model"], "GPT");
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));

        let point = &json["points"][0];
        for key in [
            "id",
            "content",
            "round_num",
            "status",
            "agreements",
            "disagreements",
            "participants",
        ] {
            assert!(point.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_roundtrip_preserves_points() {
        let snapshot =
            RoundSnapshot::capture(1, 1, &chain(), &[], RoundStatus::Ongoing, Utc::now());
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: RoundSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);
        assert!(!restored.is_completed());
    }

    #[test]
    fn test_file_name() {
        assert_eq!(RoundSnapshot::file_name(7), "round_7.json");
    }
}
