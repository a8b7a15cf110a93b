//! Discussion chain - the ordered collection of all points of a session
//!
//! The chain is seeded with exactly one point (the topic, round 1). Points are
//! only ever appended. Two matching policies route responses into points:
//!
//! - [`DiscussionChain::attach_or_create`] uses exact content equality.
//! - [`DiscussionChain::analyze_round`] uses a lexical relevance filter: a
//!   response is relevant to a point when it contains (case-insensitive
//!   substring) any whitespace-separated token of the point that is not a
//!   stopword. Questions found in responses become new points.

use super::classifier::{MarkerClassifier, StanceClassifier};
use super::point::{DiscussionPoint, PointId};
use super::response::AgentResponse;
use crate::core::topic::Topic;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Tokens ignored by the relevance filter
pub const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for",
];

/// Number of concluded points listed in a [`ChainSummary`]
const LATEST_CONCLUSIONS: usize = 3;

/// Whether `response` shares a non-stopword token with `point`
pub fn is_relevant(point: &str, response: &str) -> bool {
    let response = response.to_lowercase();
    point
        .to_lowercase()
        .split_whitespace()
        .filter(|token| !STOPWORDS.contains(token))
        .any(|token| response.contains(token))
}

/// Extract every sentence terminated by `?` from `text`
///
/// A sentence starts after the previous `.`, `!`, `?` or newline. Returned
/// sentences are trimmed and keep their trailing `?`.
pub fn extract_questions(text: &str) -> Vec<String> {
    let mut questions = Vec::new();
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '.' | '!' | '\n' => start = i + c.len_utf8(),
            '?' => {
                let sentence = text[start..=i].trim();
                if sentence.len() > 1 {
                    questions.push(sentence.to_string());
                }
                start = i + 1;
            }
            _ => {}
        }
    }

    questions
}

/// Result of routing one round of responses through the chain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundAnalysis {
    /// Number of (point, response) routings performed
    pub routed: usize,
    /// Points created from questions found in the responses
    pub new_points: Vec<PointId>,
}

/// A concluded point and its conclusion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConclusionEntry {
    pub point: String,
    pub conclusion: Option<String>,
}

/// Aggregate counts over the chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSummary {
    pub total_points: usize,
    pub concluded_points: usize,
    pub active_points: usize,
    /// Up to three most recently concluded points, most recent last
    pub latest_conclusions: Vec<ConclusionEntry>,
}

/// Ordered, append-only collection of discussion points
pub struct DiscussionChain {
    points: Vec<DiscussionPoint>,
    next_seq: u64,
    classifier: Arc<dyn StanceClassifier>,
}

impl std::fmt::Debug for DiscussionChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscussionChain")
            .field("points", &self.points)
            .field("next_seq", &self.next_seq)
            .finish_non_exhaustive()
    }
}

impl DiscussionChain {
    /// Create a chain seeded with the topic at round 1
    pub fn new(topic: &Topic) -> Self {
        Self::with_classifier(topic, Arc::new(MarkerClassifier::new()))
    }

    /// Create a chain using a custom stance classifier
    pub fn with_classifier(topic: &Topic, classifier: Arc<dyn StanceClassifier>) -> Self {
        let mut chain = Self {
            points: Vec::new(),
            next_seq: 1,
            classifier,
        };
        chain.push_point(topic.content(), 1, None);
        chain
    }

    fn push_point(&mut self, content: &str, round_num: u32, parent: Option<PointId>) -> PointId {
        let id = PointId::from_seq(self.next_seq);
        self.next_seq += 1;

        let mut point = DiscussionPoint::new(id.clone(), content, round_num);
        if let Some(parent) = parent {
            point = point.with_parent(parent);
        }
        self.points.push(point);
        id
    }

    /// Index of the most recent point with exactly this content
    fn position_by_content(&self, content: &str) -> Option<usize> {
        self.points.iter().rposition(|p| p.content() == content)
    }

    /// All points in insertion order
    pub fn points(&self) -> &[DiscussionPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The seed point created from the topic
    pub fn root(&self) -> Option<&DiscussionPoint> {
        self.points.first()
    }

    pub fn get(&self, id: &PointId) -> Option<&DiscussionPoint> {
        self.points.iter().find(|p| p.id() == id)
    }

    pub fn find_by_content(&self, content: &str) -> Option<&DiscussionPoint> {
        self.position_by_content(content).map(|i| &self.points[i])
    }

    /// Points still under discussion
    pub fn active_points(&self) -> Vec<&DiscussionPoint> {
        self.points.iter().filter(|p| p.is_active()).collect()
    }

    /// Points that reached consensus
    pub fn concluded_points(&self) -> Vec<&DiscussionPoint> {
        self.points.iter().filter(|p| p.is_concluded()).collect()
    }

    /// Return the point with exactly this content, creating it at `round_num` if absent
    pub fn seed_point(
        &mut self,
        content: &str,
        round_num: u32,
        parent: Option<PointId>,
    ) -> PointId {
        match self.position_by_content(content) {
            Some(i) => self.points[i].id().clone(),
            None => self.push_point(content, round_num, parent),
        }
    }

    /// Return an active point with exactly this content, opening a new one at
    /// `round_num` when there is none.
    ///
    /// If the content was already debated to a conclusion, the new point
    /// records that concluded point as its parent.
    pub fn reopen_point(&mut self, content: &str, round_num: u32) -> PointId {
        match self.position_by_content(content) {
            Some(i) if self.points[i].is_active() => self.points[i].id().clone(),
            Some(i) => {
                let parent = self.points[i].id().clone();
                self.push_point(content, round_num, Some(parent))
            }
            None => self.push_point(content, round_num, None),
        }
    }

    /// Route `response` to the point whose content equals `text`.
    ///
    /// A missing point is created at the response's round first.
    pub fn attach_or_create(&mut self, text: &str, response: &AgentResponse) -> PointId {
        let index = match self.position_by_content(text) {
            Some(i) => i,
            None => {
                self.push_point(text, response.round_num, response.point_id.clone());
                self.points.len() - 1
            }
        };
        self.points[index].update(response, self.classifier.as_ref());
        self.points[index].id().clone()
    }

    /// Route a round's responses into every relevant active point, then add
    /// new points for questions raised in the responses.
    ///
    /// Points are selected once, before routing. Each relevant response goes
    /// through [`DiscussionPoint::update`] in the order given, so a point may
    /// conclude partway through the round and still record the responses
    /// that follow.
    pub fn analyze_round(&mut self, round_num: u32, responses: &[AgentResponse]) -> RoundAnalysis {
        let mut analysis = RoundAnalysis::default();

        let active: Vec<usize> = self
            .points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_active())
            .map(|(i, _)| i)
            .collect();

        for index in active {
            let point = &mut self.points[index];
            for response in responses {
                if is_relevant(point.content(), &response.content) {
                    point.update(response, self.classifier.as_ref());
                    analysis.routed += 1;
                }
            }
        }

        for response in responses {
            for question in extract_questions(&response.content) {
                if self.position_by_content(&question).is_none() {
                    let id = self.push_point(&question, round_num, response.point_id.clone());
                    analysis.new_points.push(id);
                }
            }
        }

        analysis
    }

    /// Counts plus the latest conclusions
    pub fn summary(&self) -> ChainSummary {
        let concluded = self.concluded_points();
        let skip = concluded.len().saturating_sub(LATEST_CONCLUSIONS);

        ChainSummary {
            total_points: self.points.len(),
            concluded_points: concluded.len(),
            active_points: self.points.len() - concluded.len(),
            latest_conclusions: concluded
                .iter()
                .skip(skip)
                .map(|p| ConclusionEntry {
                    point: p.content().to_string(),
                    conclusion: p.conclusion().map(str::to_string),
                })
                .collect(),
        }
    }
}
