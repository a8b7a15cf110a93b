//! Agent domain
//!
//! The roster of debating agents, their personas, and the issues reported
//! while validating their configuration.

pub mod persona;
pub mod roster;
pub mod validation;

pub use persona::{SUMMARIZER_PERSONA, generic_persona, persona_for};
pub use roster::{AgentRoster, AgentSpec};
pub use validation::{ConfigIssue, ConfigIssueCode, Severity};
