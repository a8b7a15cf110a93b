//! Port for structured discussion transcripts.
//!
//! A transcript is the machine-readable record of a session: round
//! boundaries, agent responses, moderator summaries and generated points.
//! Diagnostic messages stay on `tracing`; this port only carries events a
//! consumer may replay or audit.

use serde_json::Value;

/// What happened in a transcript event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    RoundStart,
    AgentResponse,
    RoundSummary,
    NextPoints,
    RoundComplete,
    SessionTerminated,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::RoundStart => "round_start",
            EventKind::AgentResponse => "agent_response",
            EventKind::RoundSummary => "round_summary",
            EventKind::NextPoints => "next_points",
            EventKind::RoundComplete => "round_complete",
            EventKind::SessionTerminated => "session_terminated",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One transcript event.
///
/// `round` is the round the event belongs to; session-level events have
/// none. The payload holds the remaining event-specific fields. The adapter
/// stamps the UTC time when it writes the record.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationEvent {
    pub kind: EventKind,
    pub round: Option<u32>,
    pub payload: Value,
}

impl ConversationEvent {
    /// Event belonging to `round`
    pub fn in_round(kind: EventKind, round: u32, payload: Value) -> Self {
        Self {
            kind,
            round: Some(round),
            payload,
        }
    }

    /// Event about the session as a whole
    pub fn session(kind: EventKind, payload: Value) -> Self {
        Self {
            kind,
            round: None,
            payload,
        }
    }
}

/// Sink for transcript events.
///
/// `log` is synchronous and infallible; adapters drop write failures so the
/// round loop never stops on a transcript error.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Discards every event
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
