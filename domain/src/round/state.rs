//! Session state machine
//!
//! ```text
//! Uninitialized ──► RoundInProgress ──► RoundComplete ──► RoundInProgress ...
//!                                            │
//!                                            └──► Terminated
//! ```

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a discussion session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Uninitialized,
    RoundInProgress,
    RoundComplete,
    Terminated,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "Uninitialized",
            SessionState::RoundInProgress => "RoundInProgress",
            SessionState::RoundComplete => "RoundComplete",
            SessionState::Terminated => "Terminated",
        }
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, SessionState::Terminated)
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Uninitialized, RoundInProgress)
                | (RoundInProgress, RoundComplete)
                | (RoundComplete, RoundInProgress)
                | (RoundComplete, Terminated)
        )
    }

    /// Move to `next`, rejecting illegal transitions
    pub fn transition(&mut self, next: SessionState) -> Result<(), DomainError> {
        if !self.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }
        *self = next;
        Ok(())
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
