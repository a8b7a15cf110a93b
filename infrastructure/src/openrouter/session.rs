//! Single-model chat session
//!
//! Provides [`OpenRouterSession`] which implements [`LlmSession`]. Each
//! `send` is an independent single-turn request carrying the session's
//! system prompt; no history is kept between calls.

use super::gateway::Endpoint;
use super::protocol::ChatRequest;
use agora_application::ports::llm_gateway::{GatewayError, LlmSession};
use agora_domain::Model;
use async_trait::async_trait;
use std::sync::Arc;

pub struct OpenRouterSession {
    endpoint: Arc<Endpoint>,
    model: Model,
    system_prompt: String,
}

impl OpenRouterSession {
    pub(crate) fn new(endpoint: Arc<Endpoint>, model: Model, system_prompt: &str) -> Self {
        Self {
            endpoint,
            model,
            system_prompt: system_prompt.to_string(),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

#[async_trait]
impl LlmSession for OpenRouterSession {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn send(&self, content: &str) -> Result<String, GatewayError> {
        let config = self.endpoint.config();
        let request = ChatRequest::single_turn(
            &self.model,
            &self.system_prompt,
            content,
            config.temperature,
            config.max_tokens,
        );
        self.endpoint.complete(&request).await
    }
}
