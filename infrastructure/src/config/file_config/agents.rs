//! Debater and moderator configuration from TOML (`[[agents]]` and `[summarizer]`)

use agora_domain::agent::validation::{ConfigIssue, ConfigIssueCode};
use agora_domain::{AgentRoster, AgentSpec, DomainError, SUMMARIZER_PERSONA};
use serde::{Deserialize, Serialize};

/// One `[[agents]]` entry
///
/// # Example
///
/// ```toml
/// [[agents]]
/// name = "Claude"
/// model = "anthropic/claude-3.5-sonnet"
///
/// [[agents]]
/// name = "Mistral"
/// model = "mistralai/mistral-large"
/// persona = "You are Mistral, a pragmatic debater."
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAgentConfig {
    pub name: String,
    pub model: String,
    /// System prompt override; a built-in persona is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
}

impl FileAgentConfig {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            persona: None,
        }
    }

    pub fn to_spec(&self) -> AgentSpec {
        let spec = AgentSpec::new(self.name.trim(), self.model.trim());
        match &self.persona {
            Some(persona) if !persona.trim().is_empty() => spec.with_persona(persona.clone()),
            _ => spec,
        }
    }
}

/// The five reference debaters as file entries
pub fn default_agents() -> Vec<FileAgentConfig> {
    AgentRoster::reference()
        .iter()
        .map(|spec| FileAgentConfig::new(spec.name.clone(), spec.model.as_str()))
        .collect()
}

/// Build the roster, failing on the first invalid entry
pub fn to_roster(agents: &[FileAgentConfig]) -> Result<AgentRoster, DomainError> {
    AgentRoster::new(agents.iter().map(FileAgentConfig::to_spec).collect())
}

/// Report every problem in the `[[agents]]` list
pub fn validate_agents(agents: &[FileAgentConfig]) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    if agents.is_empty() {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::EmptyRoster,
            "agents: at least one agent must be configured",
        ));
        return issues;
    }

    for (index, agent) in agents.iter().enumerate() {
        let name = agent.name.trim();
        if name.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyAgentName { index },
                format!("agents[{index}]: name cannot be empty"),
            ));
        }
        if agent.model.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyModelName {
                    agent: agent.name.clone(),
                },
                format!("agents[{index}]: model cannot be empty"),
            ));
        }
        if !name.is_empty() && agents[..index].iter().any(|a| a.name.trim() == name) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::DuplicateAgent {
                    name: name.to_string(),
                },
                format!("agents[{index}]: duplicate agent name '{name}'"),
            ));
        }
    }

    issues
}

/// Raw moderator configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSummarizerConfig {
    pub name: String,
    pub model: String,
    pub persona: Option<String>,
}

impl Default for FileSummarizerConfig {
    fn default() -> Self {
        Self {
            name: "Moderator".to_string(),
            model: "anthropic/claude-3.5-sonnet".to_string(),
            persona: None,
        }
    }
}

impl FileSummarizerConfig {
    pub fn to_spec(&self) -> AgentSpec {
        let persona = self
            .persona
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(SUMMARIZER_PERSONA);
        AgentSpec::new(self.name.trim(), self.model.trim()).with_persona(persona)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        if self.model.trim().is_empty() {
            vec![ConfigIssue::error(
                ConfigIssueCode::EmptyModelName {
                    agent: "summarizer".to_string(),
                },
                "summarizer.model cannot be empty",
            )]
        } else {
            Vec::new()
        }
    }
}
