//! Discussion point aggregate
//!
//! A [`DiscussionPoint`] is one debated statement together with every response
//! routed to it. Its consensus state is derived from those responses:
//!
//! - `consensus_score = |agreements| / (|agreements| + |disagreements|)`
//! - the point concludes once it has at least [`MIN_PARTICIPANTS`] distinct
//!   participants and a score above [`CONCLUSION_THRESHOLD`]
//!
//! Conclusion is a one-way latch: a concluded point stays concluded and keeps
//! the conclusion it was given at the moment it concluded.

use super::classifier::{Stance, StanceClassifier};
use super::participants::ParticipantSet;
use super::response::AgentResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum distinct participants before a point may conclude
pub const MIN_PARTICIPANTS: usize = 3;

/// Score a point must exceed to conclude
pub const CONCLUSION_THRESHOLD: f64 = 0.7;

/// Stable identifier of a discussion point
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(String);

impl PointId {
    /// Identifier for the `seq`-th point of a chain
    pub fn from_seq(seq: u64) -> Self {
        Self(format!("point_{seq}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointStatus {
    Ongoing,
    Concluded,
}

impl PointStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PointStatus::Ongoing => "ongoing",
            PointStatus::Concluded => "concluded",
        }
    }
}

impl std::fmt::Display for PointStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classified response recorded on a point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StanceRecord {
    pub author: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A debated statement with its responses and derived consensus state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionPoint {
    id: PointId,
    content: String,
    round_num: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<PointId>,
    status: PointStatus,
    consensus_score: f64,
    participants: ParticipantSet,
    agreements: Vec<StanceRecord>,
    disagreements: Vec<StanceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    conclusion: Option<String>,
}

impl DiscussionPoint {
    pub fn new(id: PointId, content: impl Into<String>, round_num: u32) -> Self {
        Self {
            id,
            content: content.into(),
            round_num,
            parent_id: None,
            status: PointStatus::Ongoing,
            consensus_score: 0.0,
            participants: ParticipantSet::new(),
            agreements: Vec::new(),
            disagreements: Vec::new(),
            conclusion: None,
        }
    }

    /// Record the point this one originated from
    pub fn with_parent(mut self, parent: PointId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    /// Route one response into the point.
    ///
    /// Adds the author to the participants, records the classified response,
    /// recomputes the score and applies the conclusion latch. Repeated
    /// responses from the same author are all recorded.
    pub fn update(
        &mut self,
        response: &AgentResponse,
        classifier: &dyn StanceClassifier,
    ) -> Stance {
        let stance = self.record(response, classifier);
        self.recompute_score();
        self.apply_conclusion_rule();
        stance
    }

    fn record(&mut self, response: &AgentResponse, classifier: &dyn StanceClassifier) -> Stance {
        self.participants.insert(response.author.clone());

        let stance = classifier.classify(&response.content);
        let record = StanceRecord {
            author: response.author.clone(),
            content: response.content.clone(),
            timestamp: response.timestamp,
        };
        match stance {
            Stance::Agreement => self.agreements.push(record),
            Stance::Disagreement => self.disagreements.push(record),
        }
        stance
    }

    fn recompute_score(&mut self) {
        let total = self.agreements.len() + self.disagreements.len();
        if total > 0 {
            self.consensus_score = self.agreements.len() as f64 / total as f64;
        }
    }

    fn apply_conclusion_rule(&mut self) {
        if self.status == PointStatus::Concluded {
            return;
        }
        if self.participants.len() >= MIN_PARTICIPANTS
            && self.consensus_score > CONCLUSION_THRESHOLD
        {
            self.status = PointStatus::Concluded;
            self.conclusion = self.agreements.last().map(|a| a.content.clone());
        }
    }

    pub fn id(&self) -> &PointId {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn round_num(&self) -> u32 {
        self.round_num
    }

    pub fn parent_id(&self) -> Option<&PointId> {
        self.parent_id.as_ref()
    }

    pub fn status(&self) -> PointStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == PointStatus::Ongoing
    }

    pub fn is_concluded(&self) -> bool {
        self.status == PointStatus::Concluded
    }

    pub fn consensus_score(&self) -> f64 {
        self.consensus_score
    }

    pub fn participants(&self) -> &ParticipantSet {
        &self.participants
    }

    pub fn agreements(&self) -> &[StanceRecord] {
        &self.agreements
    }

    pub fn disagreements(&self) -> &[StanceRecord] {
        &self.disagreements
    }

    pub fn conclusion(&self) -> Option<&str> {
        self.conclusion.as_deref()
    }

    /// Total number of responses routed to this point
    pub fn response_count(&self) -> usize {
        self.agreements.len() + self.disagreements.len()
    }
}
