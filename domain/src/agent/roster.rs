//! Agent roster - the fixed set of debaters for one session

use super::persona::persona_for;
use crate::core::error::DomainError;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// One debating agent: a display name, the model behind it, and its persona
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    pub model: Model,
    pub persona: String,
}

impl AgentSpec {
    /// Agent using the built-in persona for `name`
    pub fn new(name: impl Into<String>, model: impl Into<Model>) -> Self {
        let name = name.into();
        let persona = persona_for(&name);
        Self {
            name,
            model: model.into(),
            persona,
        }
    }

    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }
}

/// Validated, ordered set of agents
///
/// Non-empty, names unique, every agent has a name and a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRoster {
    agents: Vec<AgentSpec>,
}

impl AgentRoster {
    pub fn new(agents: Vec<AgentSpec>) -> Result<Self, DomainError> {
        if agents.is_empty() {
            return Err(DomainError::NoAgents);
        }
        for (i, agent) in agents.iter().enumerate() {
            if agent.name.trim().is_empty() {
                return Err(DomainError::InvalidAgent(format!("agent #{} has no name", i + 1)));
            }
            if agent.model.is_empty() {
                return Err(DomainError::InvalidAgent(format!(
                    "{} has no model",
                    agent.name
                )));
            }
            if agents[..i].iter().any(|a| a.name == agent.name) {
                return Err(DomainError::DuplicateAgent(agent.name.clone()));
            }
        }
        Ok(Self { agents })
    }

    /// The five reference debaters
    pub fn reference() -> Self {
        Self {
            agents: vec![
                AgentSpec::new("GPT", "openai/gpt-4o"),
                AgentSpec::new("Claude", "anthropic/claude-3.5-sonnet"),
                AgentSpec::new("Gemini", "google/gemini-pro-1.5"),
                AgentSpec::new("DeepSeek", "deepseek/deepseek-chat"),
                AgentSpec::new("Qwen", "qwen/qwen-2.5-72b-instruct"),
            ],
        }
    }

    pub fn agents(&self) -> &[AgentSpec] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&AgentSpec> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Position of `name` in the roster
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.agents.iter().position(|a| a.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentSpec> {
        self.agents.iter()
    }
}

impl<'a> IntoIterator for &'a AgentRoster {
    type Item = &'a AgentSpec;
    type IntoIter = std::slice::Iter<'a, AgentSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.agents.iter()
    }
}
