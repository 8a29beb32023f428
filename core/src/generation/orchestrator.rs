//! Generation run orchestration

use crate::aiconfig::{
    track_metrics, AiConfig, ConfigSource, ConfigSourceConnector, EvaluationContext,
    FeedbackKind, ResolvedAiConfig,
};
use crate::config::{ModelParams, RunSettings};
use crate::error::{ConfigSourceError, Result};
use crate::llm::{ChatOptions, CompletionClientFactory, LlmClient, LlmMessage};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::plan::RunState;
use super::request::GenerationRequest;

/// Model used when a resolved config names none
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Waits between two generations
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, delay: Duration);
}

/// Pacer backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Outcome of one generation run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationResult {
    Completed {
        completed_count: u32,
        errors: Option<Vec<String>>,
        positive_feedback: u32,
        negative_feedback: u32,
    },
    Failed {
        error: String,
    },
}

impl GenerationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResult::Completed { .. })
    }

    fn from_state(state: RunState) -> Self {
        GenerationResult::Completed {
            completed_count: state.completed_count,
            errors: if state.errors.is_empty() {
                None
            } else {
                Some(state.errors)
            },
            positive_feedback: state.positive_emitted,
            negative_feedback: state.negative_emitted,
        }
    }
}

/// Everything the generation loop needs once setup succeeded
struct Session {
    resolved: ResolvedAiConfig,
    client: Arc<dyn LlmClient>,
    messages: Vec<LlmMessage>,
    options: ChatOptions,
}

/// Drives generation runs against a config source and a completion provider
pub struct Orchestrator {
    connector: Arc<dyn ConfigSourceConnector>,
    clients: Arc<dyn CompletionClientFactory>,
    pacer: Arc<dyn Pacer>,
    settings: RunSettings,
}

impl Orchestrator {
    pub fn new(
        connector: Arc<dyn ConfigSourceConnector>,
        clients: Arc<dyn CompletionClientFactory>,
        settings: RunSettings,
    ) -> Self {
        Self {
            connector,
            clients,
            pacer: Arc::new(TokioPacer),
            settings,
        }
    }

    /// Replace the pacer, e.g. with one that does not sleep
    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    /// Execute one run; never panics and never returns an error
    pub async fn run(&self, request: GenerationRequest) -> GenerationResult {
        info!(
            "Starting generation run: provider={}, config={}, count={}, good={}%",
            request.provider,
            request.config_id,
            request.total_count,
            request.good_feedback_percent
        );

        let mut source = match self.connector.connect(&request.config_service_key) {
            Ok(source) => source,
            Err(e) => {
                error!("Failed to connect to config source: {}", e);
                return GenerationResult::Failed {
                    error: e.to_string(),
                };
            }
        };

        let result = match self.prepare(source.as_mut(), &request).await {
            Ok(session) => self.generate(&session, &request).await,
            Err(e) => {
                error!("Generation setup failed: {}", e);
                GenerationResult::Failed {
                    error: e.to_string(),
                }
            }
        };

        if let Err(e) = source.close().await {
            warn!("Failed to close config source: {}", e);
        }

        result
    }

    async fn prepare(
        &self,
        source: &mut dyn ConfigSource,
        request: &GenerationRequest,
    ) -> Result<Session> {
        let timeout = self.settings.init_timeout;
        match tokio::time::timeout(timeout, source.initialize()).await {
            Ok(initialized) => initialized?,
            Err(_) => {
                return Err(ConfigSourceError::InitializationTimeout { timeout }.into())
            }
        }
        debug!("Config source initialized");

        let context = EvaluationContext::for_run();
        let fallback = AiConfig::fallback(request.provider.default_model(), request.provider.as_str());
        let resolved = source
            .resolve_config(&request.config_id, &context, fallback, &self.settings.variables)
            .await?;

        if !resolved.config.enabled {
            warn!("AI config '{}' is disabled; generating anyway", request.config_id);
        }

        let model = resolved.config.model_name().unwrap_or(DEFAULT_MODEL).to_string();
        let params = resolved.config.model_params();
        let options = chat_options(&params);
        let client = self
            .clients
            .create(request.provider.protocol(), &request.api_key, &model, params)?;
        let messages = resolved.config.messages_or_empty();

        info!(
            "Resolved AI config '{}': model={}, {} message(s)",
            request.config_id,
            model,
            messages.len()
        );

        Ok(Session {
            resolved,
            client,
            messages,
            options,
        })
    }

    async fn generate(&self, session: &Session, request: &GenerationRequest) -> GenerationResult {
        let mut state = RunState::new(request.total_count, request.good_feedback_percent);
        info!(
            "Feedback split: {} positive, {} negative",
            state.positive_target,
            state.negative_target()
        );

        for index in 0..request.total_count {
            match self.generate_one(session, &state).await {
                Ok(kind) => {
                    state.record_success(kind);
                    info!(
                        "Generation {}/{}: {} feedback (positive {}/{}, negative {}/{})",
                        index + 1,
                        request.total_count,
                        kind,
                        state.positive_emitted,
                        state.positive_target,
                        state.negative_emitted,
                        state.negative_target()
                    );
                }
                Err(e) => {
                    warn!("Generation {}/{} failed: {}", index + 1, request.total_count, e);
                    state.record_failure(e.to_string());
                }
            }

            if index + 1 < request.total_count {
                self.pacer.pause(self.settings.pacing_delay).await;
            }
        }

        info!(
            "Generation run finished: {} of {} completed, {} error(s)",
            state.completed_count,
            request.total_count,
            state.errors.len()
        );
        GenerationResult::from_state(state)
    }

    async fn generate_one(&self, session: &Session, state: &RunState) -> Result<FeedbackKind> {
        let tracker = session.resolved.tracker.as_ref();
        let response = track_metrics(tracker, || {
            session
                .client
                .chat_completion(session.messages.clone(), Some(session.options.clone()))
        })
        .await?;
        debug!(
            "Completion returned {} characters from {}",
            response.message.content.len(),
            response.model
        );

        let kind = state.next_feedback();
        tracker.track_feedback(kind).await?;
        Ok(kind)
    }
}

fn chat_options(params: &ModelParams) -> ChatOptions {
    let defaults = ChatOptions::default();
    ChatOptions {
        max_tokens: params.max_tokens.or(defaults.max_tokens),
        temperature: params.temperature.or(defaults.temperature),
        top_p: params.top_p,
        stop: params.stop_sequences.clone(),
    }
}
