//! OpenRouter LLM Gateway implementation

use super::config::OpenRouterConfig;
use super::protocol::{ChatRequest, ChatResponse, status_error};
use super::session::OpenRouterSession;
use agora_application::ports::llm_gateway::{GatewayError, LlmGateway, LlmSession};
use agora_domain::Model;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, info};

/// HTTP client bound to one chat-completions endpoint, shared by sessions
pub(crate) struct Endpoint {
    client: Client,
    config: OpenRouterConfig,
}

impl Endpoint {
    pub(crate) fn config(&self) -> &OpenRouterConfig {
        &self.config
    }

    /// POST one request and return the trimmed completion text.
    pub(crate) async fn complete(&self, request: &ChatRequest) -> Result<String, GatewayError> {
        debug!(
            "POST {} model={} messages={}",
            self.config.completions_url(),
            request.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(self.config.api_key())
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title)
            .json(request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::RequestFailed(format!("invalid response body: {e}")))?;

        parsed.into_text()
    }
}

fn map_transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

/// LLM Gateway for OpenRouter-compatible chat-completions endpoints
pub struct OpenRouterGateway {
    endpoint: Arc<Endpoint>,
}

impl OpenRouterGateway {
    /// Build the HTTP client for `config`.
    pub fn new(config: OpenRouterConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        info!("OpenRouterGateway initialized for {}", config.base_url);

        Ok(Self {
            endpoint: Arc::new(Endpoint { client, config }),
        })
    }

    pub fn config(&self) -> &OpenRouterConfig {
        self.endpoint.config()
    }
}

#[async_trait]
impl LlmGateway for OpenRouterGateway {
    async fn create_session_with_system_prompt(
        &self,
        model: &Model,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        if model.is_empty() {
            return Err(GatewayError::SessionError("model id is empty".to_string()));
        }
        Ok(Box::new(OpenRouterSession::new(
            Arc::clone(&self.endpoint),
            model.clone(),
            system_prompt,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const COMPLETIONS: &str = "/api/v1/chat/completions";

    fn gateway(server_uri: &str) -> OpenRouterGateway {
        let config = OpenRouterConfig::new(Secret::new("sk-or-test".to_string()))
            .with_base_url(format!("{server_uri}/api/v1"))
            .with_timeout(Duration::from_secs(5))
            .with_title("agora-test");
        OpenRouterGateway::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_send_posts_chat_completion_with_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(COMPLETIONS))
            .and(header("authorization", "Bearer sk-or-test"))
            .and(header("http-referer", "https://github.com/agora-debate/agora"))
            .and(header("x-title", "agora-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "gen-1",
                "choices": [{
                    "message": {"role": "assistant", "content": "I agree, ethics is universal."}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = gateway(&server.uri())
            .create_session_with_system_prompt(&Model::new("openai/gpt-4o"), "You are GPT.")
            .await
            .unwrap();
        let text = session.send("Is ethics universal?").await.unwrap();
        assert_eq!(text, "I agree, ethics is universal.");

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["model"], "openai/gpt-4o");
        assert_eq!(body["max_tokens"], 2048);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Is ethics universal?");
    }

    #[tokio::test]
    async fn test_non_success_status_maps_to_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(COMPLETIONS))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_json(json!({"error": {"message": "rate limited"}})),
            )
            .mount(&server)
            .await;

        let session = gateway(&server.uri())
            .create_session(&Model::new("qwen/qwen-2.5-72b-instruct"))
            .await
            .unwrap();
        let err = session.send("Hi").await.unwrap_err();

        match err {
            GatewayError::HttpStatus { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("rate limited"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(COMPLETIONS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let session = gateway(&server.uri())
            .create_session(&Model::new("x/y"))
            .await
            .unwrap();
        assert!(matches!(
            session.send("Hi").await,
            Err(GatewayError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_is_connection_error() {
        let uri = {
            let server = MockServer::start().await;
            server.uri()
        };

        let session = gateway(&uri)
            .create_session(&Model::new("x/y"))
            .await
            .unwrap();
        let err = session.send("Hi").await.unwrap_err();
        assert!(matches!(err, GatewayError::ConnectionError(_)));
    }

    #[tokio::test]
    async fn test_blank_model_is_rejected() {
        let result = gateway("http://127.0.0.1:9")
            .create_session(&Model::new("  "))
            .await;
        assert!(matches!(result, Err(GatewayError::SessionError(_))));
    }
}
