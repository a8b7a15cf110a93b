//! Summary agent
//!
//! A moderator built on [`AgentClient`] that condenses a round into prose
//! and proposes questions for the next round.

use super::agent_client::AgentClient;
use crate::ports::llm_gateway::LlmGateway;
use agora_domain::{AgentResponse, PromptTemplate, RoundSnapshot};
use tracing::{debug, warn};

/// Prefixes stripped from generated question lines
const BULLETS: &[char] = &['-', '*', '•'];

/// Strip a leading list marker ("1.", "2)", "-", "*") from a generated line
pub fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();

    if let Some(rest) = line.strip_prefix(BULLETS) {
        return rest.trim_start();
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(['.', ')']) {
            return rest.trim_start();
        }
    }

    line
}

/// Extract candidate questions from a moderator reply
///
/// Keeps every line containing `?`, with list markers stripped.
pub fn parse_questions(reply: &str) -> Vec<String> {
    reply
        .lines()
        .filter(|line| line.contains('?'))
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Moderator that summarizes rounds and generates next-round questions
pub struct SummaryAgent<G: LlmGateway + 'static> {
    client: AgentClient<G>,
}

impl<G: LlmGateway + 'static> SummaryAgent<G> {
    pub fn new(client: AgentClient<G>) -> Self {
        Self { client }
    }

    pub fn name(&self) -> &str {
        self.client.name()
    }

    /// Summarize a round from its snapshot.
    ///
    /// The prompt lists every point with its agreeing and disagreeing
    /// responses. A degraded response is returned when the moderator is
    /// unreachable.
    pub async fn summarize(&self, snapshot: &RoundSnapshot) -> AgentResponse {
        let prompt = PromptTemplate::summarize_prompt(&snapshot.points);
        let response = match self.client.ask(&prompt).await {
            Ok(text) => AgentResponse::new(self.name(), text, snapshot.round_num, snapshot.timestamp),
            Err(e) => {
                warn!("Summary of round {} failed: {}", snapshot.round_num, e);
                AgentResponse::degraded(self.name(), e, snapshot.round_num, snapshot.timestamp)
            }
        };
        debug!("Round {} summary has {} bytes", snapshot.round_num, response.content.len());
        response
    }

    /// Ask for 3-5 follow-up questions based on `summary`.
    ///
    /// Returns every parsed question; callers decide how many to use. An
    /// unreachable moderator yields an empty list.
    pub async fn generate_next_points(&self, summary: &str) -> Vec<String> {
        let prompt = PromptTemplate::next_points_prompt(summary);
        match self.client.ask(&prompt).await {
            Ok(reply) => parse_questions(&reply),
            Err(e) => {
                warn!("Next point generation failed: {}", e);
                Vec::new()
            }
        }
    }
}
