//! Discussion domain
//!
//! Points, the chain that owns them, and the stance classification that
//! drives consensus.
//!
//! ```text
//! AgentResponse ──► StanceClassifier ──► DiscussionPoint.update
//!                                             │
//!                        DiscussionChain ◄────┘ (routing, question extraction)
//! ```

pub mod chain;
pub mod classifier;
pub mod participants;
pub mod point;
pub mod response;

pub use chain::{
    ChainSummary, ConclusionEntry, DiscussionChain, RoundAnalysis, STOPWORDS, extract_questions,
    is_relevant,
};
pub use classifier::{AGREEMENT_MARKERS, FixedClassifier, MarkerClassifier, Stance, StanceClassifier};
pub use participants::ParticipantSet;
pub use point::{
    CONCLUSION_THRESHOLD, DiscussionPoint, MIN_PARTICIPANTS, PointId, PointStatus, StanceRecord,
};
pub use response::{AgentResponse, DEGRADED_PREFIX};
