//! Agent client
//!
//! Wraps one debating agent behind a resilient call: every attempt runs
//! under the policy timeout, failed or too-short replies are retried with
//! exponential backoff, and exhaustion yields a degraded sentinel response
//! instead of an error.

use crate::ports::clock::{Clock, Sleeper, SystemClock, TokioSleeper};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use agora_domain::util::preview;
use agora_domain::{AgentResponse, AgentSpec, PromptTemplate, RetryPolicy};
use std::sync::Arc;
use tracing::{debug, warn};

/// Resilient caller for a single agent
pub struct AgentClient<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    spec: AgentSpec,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    clock: Arc<dyn Clock>,
}

impl<G: LlmGateway + 'static> AgentClient<G> {
    pub fn new(gateway: Arc<G>, spec: AgentSpec, policy: RetryPolicy) -> Self {
        Self {
            gateway,
            spec,
            policy,
            sleeper: Arc::new(TokioSleeper),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Ask the agent for its position on `point`.
    ///
    /// Never fails: when every attempt is exhausted the returned response is
    /// a degraded sentinel carrying the last error.
    pub async fn respond(&self, point: &str, round_num: u32) -> AgentResponse {
        let prompt = PromptTemplate::point_prompt(point, round_num);
        match self.ask(&prompt).await {
            Ok(content) => AgentResponse::new(&self.spec.name, content, round_num, self.clock.now()),
            Err(e) => AgentResponse::degraded(&self.spec.name, e, round_num, self.clock.now()),
        }
    }

    /// Send `prompt` under the agent's persona with retry, backoff and timeout.
    ///
    /// Backoff of `base_delay * 2^attempt` follows every failed attempt.
    /// Returns the last error once all attempts are exhausted.
    pub async fn ask(&self, prompt: &str) -> Result<String, GatewayError> {
        let mut last_error = GatewayError::Other("no attempts configured".to_string());

        for attempt in 0..self.policy.max_attempts {
            match self.attempt(prompt).await {
                Ok(text) if self.policy.is_acceptable(&text) => {
                    debug!(
                        "{} answered on attempt {}: {}",
                        self.spec.name,
                        attempt + 1,
                        preview(&text, 200)
                    );
                    return Ok(text);
                }
                Ok(_) => last_error = GatewayError::EmptyResponse,
                Err(e) => last_error = e,
            }

            let delay = self.policy.delay_for(attempt);
            warn!(
                "{} attempt {}/{} failed: {} (retrying in {:?})",
                self.spec.name,
                attempt + 1,
                self.policy.max_attempts,
                last_error,
                delay
            );
            self.sleeper.sleep(delay).await;
        }

        warn!(
            "{} exhausted {} attempts: {}",
            self.spec.name, self.policy.max_attempts, last_error
        );
        Err(last_error)
    }

    async fn attempt(&self, prompt: &str) -> Result<String, GatewayError> {
        match tokio::time::timeout(self.policy.timeout, self.call_once(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout),
        }
    }

    async fn call_once(&self, prompt: &str) -> Result<String, GatewayError> {
        let session = self
            .gateway
            .create_session_with_system_prompt(&self.spec.model, &self.spec.persona)
            .await?;
        session.send(prompt).await
    }
}
