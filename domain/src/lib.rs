//! Domain layer for agora
//!
//! This crate contains the debate state and the rules that govern it.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Discussion
//!
//! A session debates one topic. The topic seeds a [`DiscussionChain`] of
//! [`DiscussionPoint`]s; each point accumulates agent responses, classified
//! by a [`StanceClassifier`], until enough participants agree for it to
//! conclude.
//!
//! ## Rounds
//!
//! Work happens in rounds driven by a [`SessionState`] machine. Each round
//! is persisted as a [`RoundSnapshot`]. External calls made during a round
//! follow a [`RetryPolicy`].

pub mod agent;
pub mod core;
pub mod discussion;
pub mod prompt;
pub mod round;
pub mod util;

// Re-export commonly used types
pub use agent::{
    AgentRoster, AgentSpec, SUMMARIZER_PERSONA,
    validation::{ConfigIssue, ConfigIssueCode, Severity},
};
pub use core::{error::DomainError, model::Model, topic::Topic};
pub use discussion::{
    AgentResponse, ChainSummary, ConclusionEntry, DiscussionChain, DiscussionPoint,
    MarkerClassifier, PointId, PointStatus, RoundAnalysis, Stance, StanceClassifier,
};
pub use prompt::PromptTemplate;
pub use round::{ResponseRecord, RetryPolicy, RoundSnapshot, RoundStatus, SessionState};
