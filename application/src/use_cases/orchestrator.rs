//! Discussion orchestrator
//!
//! Drives the round state machine over one [`DiscussionChain`]:
//!
//! ```text
//! initialize ─► RoundInProgress ─► conduct_round ─► RoundComplete ─┬─► RoundInProgress
//!                                                                  └─► Terminated
//! ```
//!
//! A round dispatches every agent against every active point, routes the
//! collected responses through the chain, asks the moderator for a summary
//! and next-round questions, then persists the round's completed snapshot.
//! The next round starts only after that snapshot is durably stored.

use super::agent_client::AgentClient;
use super::summary_agent::SummaryAgent;
use crate::config::DiscussionParams;
use crate::ports::clock::{Clock, Sleeper, SystemClock, TokioSleeper};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, EventKind, NoConversationLogger,
};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::snapshot_store::{SnapshotStore, StoreError};
use agora_domain::util::preview;
use agora_domain::{
    AgentResponse, AgentRoster, AgentSpec, ChainSummary, DiscussionChain, DiscussionPoint,
    DomainError, MarkerClassifier, PointId, RetryPolicy, RoundSnapshot, RoundStatus,
    SessionState, StanceClassifier, Topic,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Errors that can occur while orchestrating a discussion
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] DomainError),

    #[error("Invalid state: expected {expected}, found {actual}")]
    InvalidState {
        expected: SessionState,
        actual: SessionState,
    },

    #[error("Failed to persist snapshot of round {round}: {source}")]
    Persistence {
        round: u32,
        #[source]
        source: StoreError,
    },

    #[error("Discussion already terminated")]
    AlreadyTerminated,
}

/// Why a session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The configured round limit was reached
    MaxRounds,
    /// No point was left under discussion
    NoActivePoints,
    /// Shutdown was requested between rounds
    Cancelled,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::MaxRounds => "max_rounds",
            TerminationReason::NoActivePoints => "no_active_points",
            TerminationReason::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a finished discussion
#[derive(Debug, Clone, Serialize)]
pub struct DiscussionOutcome {
    pub rounds_completed: u32,
    pub summary: ChainSummary,
    pub concluded: Vec<DiscussionPoint>,
    pub last_round_summary: Option<String>,
    pub termination: Option<TerminationReason>,
}

/// A completed snapshot not yet durably written
struct PendingRound {
    snapshot: RoundSnapshot,
    termination: Option<TerminationReason>,
}

/// Round-level state machine for one discussion session
pub struct Orchestrator<G: LlmGateway + 'static> {
    agents: Vec<Arc<AgentClient<G>>>,
    summarizer: SummaryAgent<G>,
    store: Arc<dyn SnapshotStore>,
    params: DiscussionParams,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
    logger: Arc<dyn ConversationLogger>,
    classifier: Arc<dyn StanceClassifier>,
    cancel: CancellationToken,

    state: SessionState,
    current_round: u32,
    rounds_completed: u32,
    topic: Option<Topic>,
    chain: Option<DiscussionChain>,
    round_started_at: Option<DateTime<Utc>>,
    last_summary: Option<String>,
    pending: Option<PendingRound>,
    termination: Option<TerminationReason>,
}

impl<G: LlmGateway + 'static> Orchestrator<G> {
    /// Create an orchestrator over a fixed set of agents.
    ///
    /// Fails when the agent set is empty or two agents share a name.
    pub fn new(
        agents: Vec<AgentClient<G>>,
        summarizer: SummaryAgent<G>,
        store: Arc<dyn SnapshotStore>,
        params: DiscussionParams,
    ) -> Result<Self, OrchestratorError> {
        if agents.is_empty() {
            return Err(DomainError::NoAgents.into());
        }
        for (i, agent) in agents.iter().enumerate() {
            if agents[..i].iter().any(|a| a.name() == agent.name()) {
                return Err(DomainError::DuplicateAgent(agent.name().to_string()).into());
            }
        }

        Ok(Self {
            agents: agents.into_iter().map(Arc::new).collect(),
            summarizer,
            store,
            params,
            clock: Arc::new(SystemClock),
            sleeper: Arc::new(TokioSleeper),
            logger: Arc::new(NoConversationLogger),
            classifier: Arc::new(MarkerClassifier::new()),
            cancel: CancellationToken::new(),
            state: SessionState::Uninitialized,
            current_round: 0,
            rounds_completed: 0,
            topic: None,
            chain: None,
            round_started_at: None,
            last_summary: None,
            pending: None,
            termination: None,
        })
    }

    /// Create an orchestrator whose agents all share one gateway and retry policy
    pub fn from_roster(
        gateway: Arc<G>,
        roster: &AgentRoster,
        moderator: AgentSpec,
        policy: RetryPolicy,
        store: Arc<dyn SnapshotStore>,
        params: DiscussionParams,
    ) -> Result<Self, OrchestratorError> {
        let agents = roster
            .iter()
            .map(|spec| AgentClient::new(Arc::clone(&gateway), spec.clone(), policy))
            .collect();
        let summarizer = SummaryAgent::new(AgentClient::new(gateway, moderator, policy));
        Self::new(agents, summarizer, store, params)
    }

    // ==================== Builder Methods ====================

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sleeper used between snapshot persistence attempts
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Stance classifier for chains created by `initialize`
    pub fn with_classifier(mut self, classifier: Arc<dyn StanceClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Token checked between rounds; once cancelled the session terminates
    /// after the current round is persisted.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    // ==================== Accessors ====================

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    pub fn initial_topic(&self) -> Option<&Topic> {
        self.topic.as_ref()
    }

    /// The live chain, for presentation once the session has ended
    pub fn chain(&self) -> Option<&DiscussionChain> {
        self.chain.as_ref()
    }

    /// The moderator's summary of the most recent round, if one succeeded
    pub fn last_round_summary(&self) -> Option<&str> {
        self.last_summary.as_deref()
    }

    pub fn termination_reason(&self) -> Option<TerminationReason> {
        self.termination
    }

    /// Whether a completed snapshot is waiting for a successful write
    pub fn has_pending_snapshot(&self) -> bool {
        self.pending.is_some()
    }

    pub fn active_points(&self) -> Vec<&DiscussionPoint> {
        self.chain
            .as_ref()
            .map(DiscussionChain::active_points)
            .unwrap_or_default()
    }

    pub fn concluded_points(&self) -> Vec<&DiscussionPoint> {
        self.chain
            .as_ref()
            .map(DiscussionChain::concluded_points)
            .unwrap_or_default()
    }

    pub fn summary(&self) -> Option<ChainSummary> {
        self.chain.as_ref().map(DiscussionChain::summary)
    }

    /// Time left in the current round's nominal duration.
    ///
    /// Informational only; rounds are never cut short.
    pub fn get_remaining_time(&self) -> Duration {
        match (self.state, self.round_started_at) {
            (SessionState::Terminated, _) => Duration::ZERO,
            (_, None) => self.params.round_duration,
            (_, Some(started)) => {
                let elapsed = (self.clock.now() - started)
                    .to_std()
                    .unwrap_or(Duration::ZERO);
                self.params.round_duration.saturating_sub(elapsed)
            }
        }
    }

    // ==================== Lifecycle ====================

    /// Seed a fresh chain with `topic` and start round 1
    pub async fn initialize(&mut self, topic: &str) -> Result<(), OrchestratorError> {
        self.expect_state(SessionState::Uninitialized)?;

        let topic = Topic::new(topic)?;
        info!(
            "Initializing discussion with {} agents: {}",
            self.agents.len(),
            preview(topic.content(), 100)
        );

        self.chain = Some(DiscussionChain::with_classifier(
            &topic,
            Arc::clone(&self.classifier),
        ));
        self.topic = Some(topic);
        self.current_round = 1;
        self.begin_round().await
    }

    /// Run rounds until the session terminates
    pub async fn run(&mut self) -> Result<DiscussionOutcome, OrchestratorError> {
        self.run_with_progress(&NoProgress).await
    }

    /// Run rounds until the session terminates, reporting progress
    pub async fn run_with_progress(
        &mut self,
        progress: &dyn ProgressNotifier,
    ) -> Result<DiscussionOutcome, OrchestratorError> {
        if self.state == SessionState::Uninitialized {
            return Err(OrchestratorError::InvalidState {
                expected: SessionState::RoundInProgress,
                actual: self.state,
            });
        }

        while self.state == SessionState::RoundInProgress {
            self.conduct_round_with_progress(progress).await?;
        }

        Ok(self.outcome())
    }

    /// Run rounds until the session terminates, waiting out snapshot write
    /// failures.
    ///
    /// A round whose snapshot could not be written stays pending. After
    /// `persist_recovery_delay` the write is retried and the loop resumes.
    /// Only cancellation ends the wait, returning the persistence error with
    /// the round still pending.
    pub async fn run_until_durable(
        &mut self,
        progress: &dyn ProgressNotifier,
    ) -> Result<DiscussionOutcome, OrchestratorError> {
        let delay = self.params.persist_recovery_delay;
        loop {
            match self.run_with_progress(progress).await {
                Err(OrchestratorError::Persistence { round, source }) => {
                    error!(
                        "Round {} is not durable ({}); retrying in {:?}",
                        round, source, delay
                    );
                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => {
                            warn!("Cancelled while round {} is still pending", round);
                            return Err(OrchestratorError::Persistence { round, source });
                        }
                        _ = self.sleeper.sleep(delay) => {}
                    }
                }
                result => return result,
            }
        }
    }

    /// Process the current round
    pub async fn conduct_round(&mut self) -> Result<(), OrchestratorError> {
        self.conduct_round_with_progress(&NoProgress).await
    }

    /// Process the current round, reporting progress.
    ///
    /// If the round was already processed but its snapshot could not be
    /// written, only the write is retried.
    pub async fn conduct_round_with_progress(
        &mut self,
        progress: &dyn ProgressNotifier,
    ) -> Result<(), OrchestratorError> {
        self.expect_state(SessionState::RoundInProgress)?;
        if self.pending.is_some() {
            return self.retry_persist_with_progress(progress).await;
        }

        let round = self.current_round;
        let targets: Vec<(PointId, String)> = self
            .chain()
            .map(|chain| {
                chain
                    .active_points()
                    .into_iter()
                    .map(|p| (p.id().clone(), p.content().to_string()))
                    .collect()
            })
            .unwrap_or_default();

        info!(
            "Round {}: {} active points, {} agents",
            round,
            targets.len(),
            self.agents.len()
        );
        progress.on_round_start(round, targets.len(), targets.len() * self.agents.len());
        self.logger.log(ConversationEvent::in_round(
            EventKind::RoundStart,
            round,
            json!({
                "points": targets.iter().map(|(_, content)| content).collect::<Vec<_>>(),
            }),
        ));

        let responses = self.collect_responses(round, &targets, progress).await;

        let now = self.clock.now();
        let chain = self.chain_mut()?;
        let analysis = chain.analyze_round(round, &responses);
        debug!(
            "Round {}: routed {} responses, {} new points",
            round,
            analysis.routed,
            analysis.new_points.len()
        );
        let snapshot = RoundSnapshot::capture(
            round,
            round,
            chain,
            &responses,
            RoundStatus::Completed,
            now,
        );

        let summary = self.summarizer.summarize(&snapshot).await;
        self.logger.log(ConversationEvent::in_round(
            EventKind::RoundSummary,
            round,
            json!({
                "summary": summary.content,
                "degraded": summary.is_degraded(),
            }),
        ));
        if !summary.is_degraded() {
            progress.on_round_summary(round, &summary.content);
            self.last_summary = Some(summary.content.clone());
        }

        let termination = self.prepare_next_round(round, &summary).await?;
        self.pending = Some(PendingRound {
            snapshot,
            termination,
        });
        self.retry_persist_with_progress(progress).await
    }

    /// Retry writing a completed snapshot that previously failed to persist
    pub async fn retry_persist(&mut self) -> Result<(), OrchestratorError> {
        self.retry_persist_with_progress(&NoProgress).await
    }

    /// Retry writing a pending completed snapshot, reporting progress.
    ///
    /// On success the round completes and the next one starts (or the
    /// session terminates).
    pub async fn retry_persist_with_progress(
        &mut self,
        progress: &dyn ProgressNotifier,
    ) -> Result<(), OrchestratorError> {
        self.expect_state(SessionState::RoundInProgress)?;
        let Some(pending) = self.pending.as_ref() else {
            return Ok(());
        };

        let round = pending.snapshot.round_num;
        let attempts = self.params.persist_attempts.max(1);
        let backoff = RetryPolicy::new(attempts, self.params.persist_backoff, Duration::ZERO);
        let mut last_error = None;

        for attempt in 0..attempts {
            match self.store.save(&pending.snapshot).await {
                Ok(()) => {
                    last_error = None;
                    break;
                }
                Err(e) => {
                    warn!(
                        "Persisting round {} failed (attempt {}/{}): {}",
                        round,
                        attempt + 1,
                        attempts,
                        e
                    );
                    last_error = Some(e);
                    if attempt + 1 < attempts {
                        self.sleeper.sleep(backoff.delay_for(attempt)).await;
                    }
                }
            }
        }

        if let Some(source) = last_error {
            error!("Round {} is not durable; keeping it pending", round);
            return Err(OrchestratorError::Persistence { round, source });
        }

        let termination = self.pending.take().and_then(|p| p.termination);
        self.finish_round(termination, progress).await
    }

    // ==================== Internals ====================

    fn expect_state(&self, expected: SessionState) -> Result<(), OrchestratorError> {
        if self.state == expected {
            Ok(())
        } else if self.state.is_terminated() {
            Err(OrchestratorError::AlreadyTerminated)
        } else {
            Err(OrchestratorError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }

    fn transition(&mut self, next: SessionState) -> Result<(), OrchestratorError> {
        let actual = self.state;
        self.state
            .transition(next)
            .map_err(|_| OrchestratorError::InvalidState {
                expected: next,
                actual,
            })
    }

    fn chain_mut(&mut self) -> Result<&mut DiscussionChain, OrchestratorError> {
        let actual = self.state;
        self.chain.as_mut().ok_or(OrchestratorError::InvalidState {
            expected: SessionState::RoundInProgress,
            actual,
        })
    }

    /// Dispatch every agent against every target point.
    ///
    /// Agents answering the same point run concurrently. The result is
    /// ordered by point, then by agent position, whatever order the calls
    /// finished in.
    async fn collect_responses(
        &self,
        round: u32,
        targets: &[(PointId, String)],
        progress: &dyn ProgressNotifier,
    ) -> Vec<AgentResponse> {
        let mut tagged = Vec::with_capacity(targets.len() * self.agents.len());

        for (point_index, (point_id, content)) in targets.iter().enumerate() {
            let mut join_set = JoinSet::new();

            for (agent_index, agent) in self.agents.iter().enumerate() {
                let agent = Arc::clone(agent);
                let content = content.clone();
                join_set.spawn(async move {
                    let response = agent.respond(&content, round).await;
                    (agent_index, response)
                });
            }

            while let Some(result) = join_set.join_next().await {
                match result {
                    Ok((agent_index, response)) => {
                        if response.is_degraded() {
                            warn!("{} degraded on {}", response.author, point_id);
                        } else {
                            debug!(
                                "{} on {}: {}",
                                response.author,
                                point_id,
                                preview(&response.content, 200)
                            );
                        }
                        progress.on_agent_complete(round, &response.author, response.is_degraded());
                        self.logger.log(ConversationEvent::in_round(
                            EventKind::AgentResponse,
                            round,
                            json!({
                                "point": point_id,
                                "author": response.author,
                                "content": response.content,
                                "degraded": response.is_degraded(),
                            }),
                        ));
                        tagged.push((point_index, agent_index, response.for_point(point_id.clone())));
                    }
                    Err(e) => {
                        warn!("Agent task join error: {}", e);
                    }
                }
            }
        }

        tagged.sort_by_key(|(point_index, agent_index, _)| (*point_index, *agent_index));
        tagged.into_iter().map(|(_, _, response)| response).collect()
    }

    /// Decide whether the session ends after `round`; if not, seed the next
    /// round's points from the moderator's questions.
    async fn prepare_next_round(
        &mut self,
        round: u32,
        summary: &AgentResponse,
    ) -> Result<Option<TerminationReason>, OrchestratorError> {
        if self.cancel.is_cancelled() {
            info!("Cancellation requested; ending after round {}", round);
            return Ok(Some(TerminationReason::Cancelled));
        }
        if round >= self.params.max_rounds {
            return Ok(Some(TerminationReason::MaxRounds));
        }

        let questions: Vec<String> = if summary.is_degraded() {
            Vec::new()
        } else {
            self.summarizer
                .generate_next_points(&summary.content)
                .await
                .into_iter()
                .take(self.params.next_points_limit)
                .collect()
        };
        self.logger.log(ConversationEvent::in_round(
            EventKind::NextPoints,
            round + 1,
            json!({ "points": questions }),
        ));

        let fallback = self.topic.as_ref().map(|t| t.content().to_string());
        let chain = self.chain_mut()?;
        if questions.is_empty() {
            if let Some(topic) = fallback {
                let id = chain.reopen_point(&topic, round + 1);
                debug!("No next points generated; debating the topic again as {}", id);
            }
        } else {
            for question in &questions {
                chain.seed_point(question, round + 1, None);
            }
        }

        if chain.active_points().is_empty() {
            info!("No active points remain after round {}", round);
            return Ok(Some(TerminationReason::NoActivePoints));
        }
        Ok(None)
    }

    /// Mark the current round complete, then terminate or start the next round
    async fn finish_round(
        &mut self,
        termination: Option<TerminationReason>,
        progress: &dyn ProgressNotifier,
    ) -> Result<(), OrchestratorError> {
        self.transition(SessionState::RoundComplete)?;
        self.rounds_completed += 1;

        let round = self.current_round;
        if let Some(summary) = self.summary() {
            info!(
                "Round {} complete: {}/{} points concluded",
                round, summary.concluded_points, summary.total_points
            );
            self.logger.log(ConversationEvent::in_round(
                EventKind::RoundComplete,
                round,
                json!({
                    "total_points": summary.total_points,
                    "concluded_points": summary.concluded_points,
                    "active_points": summary.active_points,
                }),
            ));
            progress.on_round_complete(round, &summary);
        }

        match termination {
            Some(reason) => {
                self.transition(SessionState::Terminated)?;
                self.termination = Some(reason);
                info!(
                    "Discussion terminated after {} rounds ({})",
                    self.rounds_completed, reason
                );
                self.logger.log(ConversationEvent::session(
                    EventKind::SessionTerminated,
                    json!({
                        "rounds_completed": self.rounds_completed,
                        "reason": reason.as_str(),
                    }),
                ));
                progress.on_session_terminated(self.rounds_completed);
                Ok(())
            }
            None => {
                self.current_round += 1;
                self.begin_round().await
            }
        }
    }

    /// Enter `RoundInProgress` for the current round and record it as ongoing
    async fn begin_round(&mut self) -> Result<(), OrchestratorError> {
        self.transition(SessionState::RoundInProgress)?;
        let now = self.clock.now();
        self.round_started_at = Some(now);

        let round = self.current_round;
        if let Some(chain) = self.chain.as_ref() {
            let snapshot =
                RoundSnapshot::capture(round, round, chain, &[], RoundStatus::Ongoing, now);
            if let Err(e) = self.store.save(&snapshot).await {
                warn!("Could not record round {} as ongoing: {}", round, e);
            }
        }
        Ok(())
    }

    fn outcome(&self) -> DiscussionOutcome {
        let (summary, concluded) = match self.chain.as_ref() {
            Some(chain) => (
                chain.summary(),
                chain.concluded_points().into_iter().cloned().collect(),
            ),
            None => (
                ChainSummary {
                    total_points: 0,
                    concluded_points: 0,
                    active_points: 0,
                    latest_conclusions: Vec::new(),
                },
                Vec::new(),
            ),
        };

        DiscussionOutcome {
            rounds_completed: self.rounds_completed,
            summary,
            concluded,
            last_round_summary: self.last_summary.clone(),
            termination: self.termination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use crate::ports::snapshot_store::InMemorySnapshotStore;
    use crate::use_cases::test_support::{FixedClock, RecordingSleeper, Reply, ScriptedGateway};
    use agora_domain::PointStatus;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    const AGENTS: [(&str, &str); 5] = [
        ("GPT", "openai/gpt-4o"),
        ("Claude", "anthropic/claude-3.5-sonnet"),
        ("Gemini", "google/gemini-pro-1.5"),
        ("DeepSeek", "deepseek/deepseek-chat"),
        ("Qwen", "qwen/qwen-2.5-72b-instruct"),
    ];
    const MODERATOR: &str = "moderator/summary";

    fn policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(10), Duration::from_secs(1))
    }

    fn build(
        gateway: Arc<ScriptedGateway>,
        store: Arc<dyn SnapshotStore>,
        params: DiscussionParams,
    ) -> Orchestrator<ScriptedGateway> {
        let sleeper = Arc::new(RecordingSleeper::default());
        let agents = AGENTS
            .iter()
            .map(|(name, model)| {
                AgentClient::new(Arc::clone(&gateway), AgentSpec::new(*name, *model), policy())
                    .with_sleeper(sleeper.clone())
            })
            .collect();
        let summarizer = SummaryAgent::new(
            AgentClient::new(gateway, AgentSpec::new("Moderator", MODERATOR), policy())
                .with_sleeper(sleeper.clone()),
        );
        Orchestrator::new(agents, summarizer, store, params)
            .unwrap()
            .with_sleeper(sleeper)
    }

    /// Four agreeing agents, one dissenting; the moderator asks `questions`
    fn debate_gateway(questions: &'static str) -> ScriptedGateway {
        ScriptedGateway::with_responder(move |model, prompt| {
            if model == MODERATOR {
                return if prompt.contains("new discussion questions") {
                    questions.to_string()
                } else {
                    "The agents mostly agree.".to_string()
                };
            }
            let reply = match model {
                "openai/gpt-4o" => "I agree: ethics is universal.",
                "anthropic/claude-3.5-sonnet" => "Indeed, ethics binds everyone.",
                "google/gemini-pro-1.5" => "Ethics varies across cultures.",
                "deepseek/deepseek-chat" => "I consider ethics universal.",
                _ => "Exactly, ethics is universal.",
            };
            reply.to_string()
        })
    }

    fn dissent_gateway() -> ScriptedGateway {
        ScriptedGateway::with_responder(|model, prompt| {
            if model == MODERATOR {
                return if prompt.contains("new discussion questions") {
                    "1. Is morality innate?\n2. Are values shared?".to_string()
                } else {
                    "No agreement yet.".to_string()
                };
            }
            "I disagree; the point is contested.".to_string()
        })
    }

    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl RecordingProgress {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ProgressNotifier for RecordingProgress {
        fn on_round_start(&self, round: u32, points: usize, calls: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start {round} {points} {calls}"));
        }

        fn on_agent_complete(&self, _round: u32, agent: &str, degraded: bool) {
            if degraded {
                self.events.lock().unwrap().push(format!("degraded {agent}"));
            }
        }

        fn on_round_complete(&self, round: u32, summary: &ChainSummary) {
            self.events
                .lock()
                .unwrap()
                .push(format!("complete {round} {}", summary.concluded_points));
        }

        fn on_session_terminated(&self, rounds: u32) {
            self.events.lock().unwrap().push(format!("terminated {rounds}"));
        }
    }

    /// Store that rejects the first `failures` completed snapshots
    struct FlakyStore {
        inner: InMemorySnapshotStore,
        failures: AtomicU32,
    }

    impl FlakyStore {
        fn new(failures: u32) -> Self {
            Self {
                inner: InMemorySnapshotStore::new(),
                failures: AtomicU32::new(failures),
            }
        }
    }

    #[async_trait]
    impl SnapshotStore for FlakyStore {
        async fn save(&self, snapshot: &RoundSnapshot) -> Result<(), StoreError> {
            if snapshot.is_completed()
                && self
                    .failures
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok()
            {
                return Err(StoreError::Io(std::io::Error::other("disk full")));
            }
            self.inner.save(snapshot).await
        }

        async fn load(&self, round_num: u32) -> Result<Option<RoundSnapshot>, StoreError> {
            self.inner.load(round_num).await
        }

        async fn latest_round(&self) -> Result<Option<u32>, StoreError> {
            self.inner.latest_round().await
        }
    }

    #[tokio::test]
    async fn test_single_round_reaches_consensus() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let gateway = Arc::new(debate_gateway(""));
        let mut orchestrator = build(
            gateway,
            store.clone(),
            DiscussionParams::default().with_max_rounds(1),
        );

        orchestrator.initialize("Is ethics universal?").await.unwrap();
        let outcome = orchestrator.run().await.unwrap();

        assert_eq!(outcome.rounds_completed, 1);
        assert_eq!(outcome.termination, Some(TerminationReason::MaxRounds));
        assert_eq!(orchestrator.state(), SessionState::Terminated);

        let root = orchestrator.chain().unwrap().root().unwrap();
        assert_eq!(root.status(), PointStatus::Concluded);
        assert!((root.consensus_score() - 0.8).abs() < 1e-9);
        assert_eq!(root.participants().len(), 5);
        // DeepSeek's agreement lifts the score to 3/4 with four participants
        assert_eq!(root.conclusion(), Some("I consider ethics universal."));

        assert_eq!(outcome.concluded.len(), 1);
        assert_eq!(
            outcome.last_round_summary.as_deref(),
            Some("The agents mostly agree.")
        );

        let snapshot = store.load(1).await.unwrap().unwrap();
        assert!(snapshot.is_completed());
        assert_eq!(snapshot.responses.len(), 5);
        assert!(snapshot.current_round >= snapshot.round_num);
    }

    #[tokio::test]
    async fn test_rounds_advance_until_max_rounds() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let gateway = Arc::new(dissent_gateway());
        let mut orchestrator = build(
            Arc::clone(&gateway),
            store.clone(),
            DiscussionParams::default().with_max_rounds(3),
        );

        orchestrator.initialize("Is ethics universal?").await.unwrap();
        let progress = RecordingProgress::default();
        let outcome = orchestrator.run_with_progress(&progress).await.unwrap();

        assert_eq!(outcome.rounds_completed, 3);
        assert_eq!(orchestrator.current_round(), 3);
        assert_eq!(outcome.termination, Some(TerminationReason::MaxRounds));

        let chain = orchestrator.chain().unwrap();
        assert_eq!(chain.len(), 3);
        let innate = chain.find_by_content("Is morality innate?").unwrap();
        assert_eq!(innate.round_num(), 2);

        // summary + next points for rounds 1 and 2, summary only for round 3
        assert_eq!(gateway.calls(MODERATOR), 5);

        assert_eq!(store.latest_round().await.unwrap(), Some(3));
        for round in 1..=3 {
            assert!(store.load(round).await.unwrap().unwrap().is_completed());
        }

        let events = progress.events();
        assert_eq!(events[0], "start 1 1 5");
        assert!(events.contains(&"start 2 3 15".to_string()));
        assert_eq!(events.last().unwrap(), "terminated 3");
    }

    #[tokio::test]
    async fn test_terminates_when_no_points_remain() {
        let store = Arc::new(InMemorySnapshotStore::new());
        // the only question asked is the concluded topic itself
        let gateway = Arc::new(debate_gateway("1. Is ethics universal?"));
        let mut orchestrator = build(gateway, store, DiscussionParams::default().with_max_rounds(5));

        orchestrator.initialize("Is ethics universal?").await.unwrap();
        let outcome = orchestrator.run().await.unwrap();

        assert_eq!(outcome.rounds_completed, 1);
        assert_eq!(outcome.termination, Some(TerminationReason::NoActivePoints));
        assert!(orchestrator.active_points().is_empty());
        assert_eq!(orchestrator.chain().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_topic_is_debated_again_when_no_questions_are_generated() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let gateway = Arc::new(debate_gateway("No further questions."));
        let mut orchestrator = build(
            gateway,
            store.clone(),
            DiscussionParams::default().with_max_rounds(3),
        );

        orchestrator.initialize("Is ethics universal?").await.unwrap();
        let progress = RecordingProgress::default();
        let outcome = orchestrator.run_with_progress(&progress).await.unwrap();

        assert_eq!(outcome.rounds_completed, 3);
        assert_eq!(outcome.termination, Some(TerminationReason::MaxRounds));
        assert!(progress.events().contains(&"start 2 1 5".to_string()));

        let chain = orchestrator.chain().unwrap();
        assert_eq!(chain.len(), 3);
        let points = chain.points();
        assert!(points.iter().all(|p| p.content() == "Is ethics universal?"));
        assert_eq!(points[1].round_num(), 2);
        assert_eq!(points[1].parent_id(), Some(points[0].id()));
        assert_eq!(points[2].parent_id(), Some(points[1].id()));
        assert!(points.iter().all(DiscussionPoint::is_concluded));

        let second = store.load(2).await.unwrap().unwrap();
        assert_eq!(second.responses.len(), 5);
    }

    #[tokio::test]
    async fn test_unreachable_agent_degrades_without_aborting() {
        let gateway = Arc::new(debate_gateway("").script(
            "google/gemini-pro-1.5",
            vec![
                Reply::Fail(GatewayError::Timeout),
                Reply::Fail(GatewayError::Timeout),
                Reply::Fail(GatewayError::Timeout),
            ],
        ));
        let store = Arc::new(InMemorySnapshotStore::new());
        let mut orchestrator = build(gateway, store.clone(), DiscussionParams::default().with_max_rounds(1));

        orchestrator.initialize("Is ethics universal?").await.unwrap();
        let progress = RecordingProgress::default();
        orchestrator.run_with_progress(&progress).await.unwrap();

        assert!(progress.events().contains(&"degraded Gemini".to_string()));
        let snapshot = store.load(1).await.unwrap().unwrap();
        let gemini = snapshot.responses.iter().find(|r| r.model == "Gemini").unwrap();
        assert!(gemini.content.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_ongoing_snapshot_written_at_round_start() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let mut orchestrator = build(
            Arc::new(dissent_gateway()),
            store.clone(),
            DiscussionParams::default().with_max_rounds(2),
        );

        orchestrator.initialize("Is ethics universal?").await.unwrap();
        assert_eq!(orchestrator.state(), SessionState::RoundInProgress);
        let first = store.load(1).await.unwrap().unwrap();
        assert_eq!(first.status, RoundStatus::Ongoing);
        assert!(first.responses.is_empty());

        orchestrator.conduct_round().await.unwrap();
        assert!(store.load(1).await.unwrap().unwrap().is_completed());
        assert_eq!(
            store.load(2).await.unwrap().unwrap().status,
            RoundStatus::Ongoing
        );
        assert_eq!(orchestrator.current_round(), 2);
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_round_pending() {
        let store = Arc::new(FlakyStore::new(2));
        let gateway = Arc::new(debate_gateway(""));
        let sleeper = Arc::new(RecordingSleeper::default());
        let mut orchestrator = build(
            gateway,
            store.clone(),
            DiscussionParams::default()
                .with_max_rounds(1)
                .with_persist_attempts(2)
                .with_persist_backoff(Duration::from_millis(5)),
        )
        .with_sleeper(sleeper.clone());

        orchestrator.initialize("Is ethics universal?").await.unwrap();
        let err = orchestrator.run().await.unwrap_err();

        assert!(matches!(err, OrchestratorError::Persistence { round: 1, .. }));
        assert_eq!(orchestrator.state(), SessionState::RoundInProgress);
        assert!(orchestrator.has_pending_snapshot());
        assert_eq!(orchestrator.rounds_completed(), 0);
        assert_eq!(sleeper.delays(), vec![Duration::from_millis(5)]);
        assert_eq!(
            store.load(1).await.unwrap().unwrap().status,
            RoundStatus::Ongoing
        );

        orchestrator.retry_persist().await.unwrap();
        assert_eq!(orchestrator.state(), SessionState::Terminated);
        assert!(!orchestrator.has_pending_snapshot());
        assert!(store.load(1).await.unwrap().unwrap().is_completed());
    }

    #[tokio::test]
    async fn test_run_until_durable_outlasts_store_outage() {
        // five failed writes against two attempts per try
        let store = Arc::new(FlakyStore::new(5));
        let sleeper = Arc::new(RecordingSleeper::default());
        let mut orchestrator = build(
            Arc::new(debate_gateway("")),
            store.clone(),
            DiscussionParams::default()
                .with_max_rounds(1)
                .with_persist_attempts(2)
                .with_persist_backoff(Duration::from_millis(5))
                .with_persist_recovery_delay(Duration::from_secs(1)),
        )
        .with_sleeper(sleeper.clone());

        orchestrator.initialize("Is ethics universal?").await.unwrap();
        let outcome = orchestrator.run_until_durable(&NoProgress).await.unwrap();

        assert_eq!(outcome.rounds_completed, 1);
        assert_eq!(outcome.termination, Some(TerminationReason::MaxRounds));
        assert!(!orchestrator.has_pending_snapshot());
        assert!(store.load(1).await.unwrap().unwrap().is_completed());
        assert_eq!(
            sleeper.delays(),
            vec![
                Duration::from_millis(5),
                Duration::from_secs(1),
                Duration::from_millis(5),
                Duration::from_secs(1),
                Duration::from_millis(5),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_until_durable_stops_on_cancellation() {
        let token = CancellationToken::new();
        let store = Arc::new(FlakyStore::new(u32::MAX));
        let mut orchestrator = build(
            Arc::new(debate_gateway("")),
            store,
            DiscussionParams::default()
                .with_max_rounds(3)
                .with_persist_attempts(1),
        )
        .with_cancellation(token.clone());

        orchestrator.initialize("Is ethics universal?").await.unwrap();
        token.cancel();
        let err = orchestrator.run_until_durable(&NoProgress).await.unwrap_err();

        assert!(matches!(err, OrchestratorError::Persistence { round: 1, .. }));
        assert!(orchestrator.has_pending_snapshot());
        assert_eq!(orchestrator.state(), SessionState::RoundInProgress);
    }

    #[tokio::test]
    async fn test_cancellation_stops_after_current_round() {
        let token = CancellationToken::new();
        let mut orchestrator = build(
            Arc::new(dissent_gateway()),
            Arc::new(InMemorySnapshotStore::new()),
            DiscussionParams::default().with_max_rounds(5),
        )
        .with_cancellation(token.clone());

        orchestrator.initialize("Is ethics universal?").await.unwrap();
        token.cancel();
        let outcome = orchestrator.run().await.unwrap();

        assert_eq!(outcome.rounds_completed, 1);
        assert_eq!(outcome.termination, Some(TerminationReason::Cancelled));
    }

    #[tokio::test]
    async fn test_state_guards() {
        let mut orchestrator = build(
            Arc::new(debate_gateway("")),
            Arc::new(InMemorySnapshotStore::new()),
            DiscussionParams::default().with_max_rounds(1),
        );

        assert!(matches!(
            orchestrator.conduct_round().await,
            Err(OrchestratorError::InvalidState {
                expected: SessionState::RoundInProgress,
                actual: SessionState::Uninitialized,
            })
        ));
        assert!(matches!(
            orchestrator.run().await,
            Err(OrchestratorError::InvalidState { .. })
        ));
        assert!(matches!(
            orchestrator.initialize("   ").await,
            Err(OrchestratorError::Configuration(DomainError::EmptyTopic))
        ));

        orchestrator.initialize("Is ethics universal?").await.unwrap();
        assert!(matches!(
            orchestrator.initialize("Again?").await,
            Err(OrchestratorError::InvalidState { .. })
        ));

        orchestrator.run().await.unwrap();
        assert!(matches!(
            orchestrator.conduct_round().await,
            Err(OrchestratorError::AlreadyTerminated)
        ));
    }

    #[tokio::test]
    async fn test_remaining_time_tracks_clock() {
        let clock = Arc::new(FixedClock::new());
        let mut orchestrator = build(
            Arc::new(debate_gateway("")),
            Arc::new(InMemorySnapshotStore::new()),
            DiscussionParams::default().with_round_duration(Duration::from_secs(180)),
        )
        .with_clock(clock.clone());

        assert_eq!(orchestrator.get_remaining_time(), Duration::from_secs(180));
        orchestrator.initialize("Is ethics universal?").await.unwrap();

        clock.advance(Duration::from_secs(60));
        assert_eq!(orchestrator.get_remaining_time(), Duration::from_secs(120));

        clock.advance(Duration::from_secs(500));
        assert_eq!(orchestrator.get_remaining_time(), Duration::ZERO);
    }

    #[test]
    fn test_roster_must_be_valid() {
        let gateway = Arc::new(ScriptedGateway::new());
        let store: Arc<dyn SnapshotStore> = Arc::new(InMemorySnapshotStore::new());
        let summarizer = || {
            SummaryAgent::new(AgentClient::new(
                Arc::clone(&gateway),
                AgentSpec::new("Moderator", MODERATOR),
                policy(),
            ))
        };

        let empty = Orchestrator::new(
            Vec::new(),
            summarizer(),
            Arc::clone(&store),
            DiscussionParams::default(),
        );
        assert!(matches!(
            empty,
            Err(OrchestratorError::Configuration(DomainError::NoAgents))
        ));

        let twins = vec![
            AgentClient::new(Arc::clone(&gateway), AgentSpec::new("GPT", "a/b"), policy()),
            AgentClient::new(Arc::clone(&gateway), AgentSpec::new("GPT", "c/d"), policy()),
        ];
        let duplicate = Orchestrator::new(twins, summarizer(), store, DiscussionParams::default());
        assert!(matches!(
            duplicate,
            Err(OrchestratorError::Configuration(DomainError::DuplicateAgent(_)))
        ));
    }

    #[test]
    fn test_from_roster_uses_every_agent() {
        let orchestrator = Orchestrator::from_roster(
            Arc::new(ScriptedGateway::new()),
            &AgentRoster::reference(),
            AgentSpec::new("Moderator", MODERATOR),
            policy(),
            Arc::new(InMemorySnapshotStore::new()),
            DiscussionParams::default(),
        )
        .unwrap();
        assert_eq!(orchestrator.agents.len(), 5);
        assert_eq!(orchestrator.state(), SessionState::Uninitialized);
    }
}
