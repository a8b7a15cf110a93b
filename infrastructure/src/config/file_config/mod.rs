//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain and application
//! types by the `to_*` methods.

mod agents;
mod api;
mod discussion;
mod logging;

pub use agents::{FileAgentConfig, FileSummarizerConfig, default_agents};
pub use api::FileApiConfig;
pub use discussion::FileDiscussionConfig;
pub use logging::FileLoggingConfig;

use agora_domain::agent::validation::ConfigIssue;
use agora_domain::{AgentRoster, DomainError};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Round loop settings
    pub discussion: FileDiscussionConfig,
    /// Endpoint, retry and sampling settings
    pub api: FileApiConfig,
    /// Debating agents, in response order
    pub agents: Vec<FileAgentConfig>,
    /// Moderator producing round summaries and next points
    pub summarizer: FileSummarizerConfig,
    pub logging: FileLoggingConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            discussion: FileDiscussionConfig::default(),
            api: FileApiConfig::default(),
            agents: default_agents(),
            summarizer: FileSummarizerConfig::default(),
            logging: FileLoggingConfig::default(),
        }
    }
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Any issue with `Severity::Error` means the session must not start.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.discussion.validate());
        issues.extend(self.api.validate());
        issues.extend(agents::validate_agents(&self.agents));
        issues.extend(self.summarizer.validate());
        issues
    }

    /// Debaters as a validated roster
    pub fn roster(&self) -> Result<AgentRoster, DomainError> {
        agents::to_roster(&self.agents)
    }
}
