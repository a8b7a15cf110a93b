//! Round lifecycle
//!
//! Session state transitions, the persisted per-round snapshot, and the
//! retry policy applied to every external call made during a round.

pub mod retry;
pub mod snapshot;
pub mod state;

pub use retry::RetryPolicy;
pub use snapshot::{ResponseRecord, RoundSnapshot, RoundStatus};
pub use state::SessionState;
