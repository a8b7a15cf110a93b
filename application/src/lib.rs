//! Application layer for agora
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::DiscussionParams;
pub use ports::{
    clock::{Clock, Sleeper, SystemClock, TokioSleeper},
    conversation_logger::{ConversationEvent, ConversationLogger, EventKind, NoConversationLogger},
    llm_gateway::{GatewayError, LlmGateway, LlmSession},
    progress::{NoProgress, ProgressNotifier},
    snapshot_store::{InMemorySnapshotStore, SnapshotStore, StoreError},
};
pub use use_cases::agent_client::AgentClient;
pub use use_cases::orchestrator::{
    DiscussionOutcome, Orchestrator, OrchestratorError, TerminationReason,
};
pub use use_cases::summary_agent::{SummaryAgent, parse_questions, strip_list_marker};
