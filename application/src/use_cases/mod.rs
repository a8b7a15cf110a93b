//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod agent_client;
pub mod orchestrator;
pub mod summary_agent;

#[cfg(test)]
pub(crate) mod test_support;
