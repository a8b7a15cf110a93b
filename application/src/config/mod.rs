//! Application-level configuration.
//!
//! - [`DiscussionParams`] - round loop control (round limit, persistence retries)

pub mod discussion_params;

pub use discussion_params::DiscussionParams;
