//! Agent response value object

use super::point::PointId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix carried by sentinel responses produced when an agent could not be reached
pub const DEGRADED_PREFIX: &str = "Error:";

/// A single agent's reply to a discussion point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Name of the agent that produced the response
    pub author: String,
    /// Response text (or sentinel error text when degraded)
    pub content: String,
    /// Round the response belongs to
    pub round_num: u32,
    /// When the response was received
    pub timestamp: DateTime<Utc>,
    /// Whether this is a sentinel standing in for a failed call
    #[serde(default)]
    pub degraded: bool,
    /// Point the agent was asked about, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_id: Option<PointId>,
}

impl AgentResponse {
    /// A successful response
    pub fn new(
        author: impl Into<String>,
        content: impl Into<String>,
        round_num: u32,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            round_num,
            timestamp,
            degraded: false,
            point_id: None,
        }
    }

    /// A sentinel response for an agent whose call attempts were exhausted
    pub fn degraded(
        author: impl Into<String>,
        reason: impl std::fmt::Display,
        round_num: u32,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let author = author.into();
        let content = format!("{DEGRADED_PREFIX} no valid response from {author}: {reason}");
        Self {
            author,
            content,
            round_num,
            timestamp,
            degraded: true,
            point_id: None,
        }
    }

    /// Tag the response with the point it answers
    pub fn for_point(mut self, point_id: PointId) -> Self {
        self.point_id = Some(point_id);
        self
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_response_is_marked() {
        let response = AgentResponse::degraded("Gemini", "Timeout", 2, Utc::now());
        assert!(response.is_degraded());
        assert!(response.content.starts_with(DEGRADED_PREFIX));
        assert!(response.content.contains("Gemini"));
        assert!(response.content.contains("Timeout"));
        assert_eq!(response.round_num, 2);
    }

    #[test]
    fn test_degraded_flag_defaults_when_missing() {
        let json = r#"{"author":"GPT","content":"I agree","round_num":1,"timestamp":"2024-01-01T00:00:00Z"}"#;
        let response: AgentResponse = serde_json::from_str(json).unwrap();
        assert!(!response.is_degraded());
    }
}
