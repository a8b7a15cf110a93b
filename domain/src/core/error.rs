//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Discussion topic cannot be empty")]
    EmptyTopic,

    #[error("No agents configured for the discussion")]
    NoAgents,

    #[error("Invalid agent definition: {0}")]
    InvalidAgent(String),

    #[error("Duplicate agent name: {0}")]
    DuplicateAgent(String),

    #[error("Invalid session transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Unknown discussion point: {0}")]
    UnknownPoint(String),
}

impl DomainError {
    /// Check if this error means the agent roster cannot be used
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DomainError::NoAgents | DomainError::InvalidAgent(_) | DomainError::DuplicateAgent(_)
        )
    }
}
