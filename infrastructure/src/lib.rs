//! Infrastructure layer for agora
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod openrouter;
pub mod snapshot;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileAgentConfig, FileApiConfig, FileConfig, FileDiscussionConfig,
    FileLoggingConfig, FileSummarizerConfig,
};
pub use logging::JsonlConversationLogger;
pub use openrouter::{OpenRouterConfig, OpenRouterGateway, OpenRouterSession};
pub use snapshot::FileSnapshotStore;
