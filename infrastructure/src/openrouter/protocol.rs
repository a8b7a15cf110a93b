//! Chat-completions wire types

use agora_application::GatewayError;
use agora_domain::Model;
use agora_domain::util::truncate_str;
use serde::{Deserialize, Serialize};

/// Longest error body kept in a [`GatewayError::HttpStatus`]
const MAX_ERROR_BODY: usize = 500;

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatRequest {
    /// Build a single-turn request.
    ///
    /// A blank system prompt is omitted. `max_tokens` is only sent to models
    /// that expect an explicit bound.
    pub fn single_turn(
        model: &Model,
        system_prompt: &str,
        content: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        let mut messages = Vec::with_capacity(2);
        if !system_prompt.trim().is_empty() {
            messages.push(ChatMessage::system(system_prompt));
        }
        messages.push(ChatMessage::user(content));

        Self {
            model: model.as_str().to_string(),
            messages,
            temperature,
            max_tokens: model.wants_token_limit().then_some(max_tokens),
        }
    }
}

impl ChatResponse {
    /// Trimmed text of the first choice.
    pub fn into_text(self) -> Result<String, GatewayError> {
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            Err(GatewayError::EmptyResponse)
        } else {
            Ok(text)
        }
    }
}

/// Map a non-success status and its body to a gateway error.
pub fn status_error(status: u16, body: &str) -> GatewayError {
    GatewayError::HttpStatus {
        status,
        body: truncate_body(body.trim()),
    }
}

fn truncate_body(body: &str) -> String {
    let cut = truncate_str(body, MAX_ERROR_BODY);
    if cut.len() == body.len() {
        body.to_string()
    } else {
        format!("{cut}...")
    }
}
