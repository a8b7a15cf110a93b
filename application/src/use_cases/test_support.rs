//! Test doubles shared by the use case tests

use crate::ports::clock::{Clock, Sleeper};
use crate::ports::llm_gateway::{GatewayError, LlmGateway, LlmSession};
use agora_domain::Model;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted reply to a `send` call
pub enum Reply {
    Text(String),
    Fail(GatewayError),
    /// Never answers within any reasonable timeout
    Hang,
}

impl Reply {
    pub fn text(s: &str) -> Self {
        Reply::Text(s.to_string())
    }
}

type Responder = dyn Fn(&str, &str) -> String + Send + Sync;

#[derive(Default)]
struct GatewayState {
    scripts: HashMap<String, VecDeque<Reply>>,
    calls: Vec<(String, String, String)>,
}

/// Gateway answering from per-model scripts, then from a responder closure
pub struct ScriptedGateway {
    state: Arc<Mutex<GatewayState>>,
    responder: Arc<Responder>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::with_responder(|_, _| "I observe nothing new.".to_string())
    }

    /// Unscripted calls are answered by `responder(model, prompt)`
    pub fn with_responder(
        responder: impl Fn(&str, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(GatewayState::default())),
            responder: Arc::new(responder),
        }
    }

    pub fn script(self, model: &str, replies: Vec<Reply>) -> Self {
        self.state
            .lock()
            .unwrap()
            .scripts
            .entry(model.to_string())
            .or_default()
            .extend(replies);
        self
    }

    /// Number of `send` calls made to `model`
    pub fn calls(&self, model: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(m, _, _)| m == model)
            .count()
    }

    /// `(system prompt, user prompt)` of every call to `model`
    pub fn prompts(&self, model: &str) -> Vec<(String, String)> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(m, _, _)| m == model)
            .map(|(_, system, user)| (system.clone(), user.clone()))
            .collect()
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn create_session_with_system_prompt(
        &self,
        model: &Model,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(ScriptedSession {
            model: model.clone(),
            system_prompt: system_prompt.to_string(),
            state: Arc::clone(&self.state),
            responder: Arc::clone(&self.responder),
        }))
    }
}

struct ScriptedSession {
    model: Model,
    system_prompt: String,
    state: Arc<Mutex<GatewayState>>,
    responder: Arc<Responder>,
}

#[async_trait]
impl LlmSession for ScriptedSession {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn send(&self, content: &str) -> Result<String, GatewayError> {
        let reply = {
            let mut state = self.state.lock().unwrap();
            state.calls.push((
                self.model.to_string(),
                self.system_prompt.clone(),
                content.to_string(),
            ));
            state
                .scripts
                .get_mut(self.model.as_str())
                .and_then(|queue| queue.pop_front())
        };

        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(error)) => Err(error),
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(GatewayError::Other("unreachable".to_string()))
            }
            None => Ok((self.responder)(self.model.as_str(), content)),
        }
    }
}

/// Sleeper that records requested delays and returns immediately
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// Clock that only moves when told to
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(by).unwrap();
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
