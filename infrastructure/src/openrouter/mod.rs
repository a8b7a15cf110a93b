//! OpenRouter-compatible chat-completions adapter
//!
//! Implements [`LlmGateway`](agora_application::LlmGateway) over HTTP with
//! `reqwest`. Any endpoint speaking the OpenAI chat-completions dialect works;
//! the base URL defaults to OpenRouter.

pub mod config;
pub mod gateway;
pub mod protocol;
pub mod session;

pub use config::OpenRouterConfig;
pub use gateway::OpenRouterGateway;
pub use session::OpenRouterSession;
