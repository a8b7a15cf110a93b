//! Connection settings for the chat-completions endpoint

use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

/// Default endpoint root
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Connection settings for [`OpenRouterGateway`](super::OpenRouterGateway).
///
/// The API key is held as a [`Secret`] and only exposed when the
/// `Authorization` header is built.
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    api_key: Secret<String>,
    /// Endpoint root; `/chat/completions` is appended.
    pub base_url: String,
    /// HTTP client timeout for a single request.
    pub timeout: Duration,
    /// Sampling temperature sent with every request.
    pub temperature: f32,
    /// Completion bound sent to models that expect one.
    pub max_tokens: u32,
    /// Value of the `HTTP-Referer` header.
    pub referer: String,
    /// Value of the `X-Title` header.
    pub title: String,
}

impl OpenRouterConfig {
    pub fn new(api_key: Secret<String>) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            temperature: 0.7,
            max_tokens: 2048,
            referer: "https://github.com/agora-debate/agora".to_string(),
            title: "agora".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = referer.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Full URL of the chat-completions endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}
