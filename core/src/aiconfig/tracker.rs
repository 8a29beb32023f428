//! Metric and feedback tracking for a resolved AI config

use crate::error::Result;
use crate::llm::{LlmResponse, Usage};
use async_trait::async_trait;
use std::future::Future;
use std::time::{Duration, Instant};

use super::types::FeedbackKind;

/// Sink for generation telemetry of one AI config
#[async_trait]
pub trait AiTracker: Send + Sync {
    /// Record how long a generation took
    async fn track_duration(&self, duration: Duration);

    /// Record token usage of a generation
    async fn track_tokens(&self, usage: Usage);

    /// Record a successful generation
    async fn track_success(&self);

    /// Record a failed generation
    async fn track_error(&self);

    /// Record user feedback on a generation
    async fn track_feedback(&self, kind: FeedbackKind) -> Result<()>;
}

/// Results that can report token usage to a tracker
pub trait UsageReport {
    fn usage(&self) -> Option<Usage>;
}

impl UsageReport for LlmResponse {
    fn usage(&self) -> Option<Usage> {
        self.usage
    }
}

/// Run `operation` while recording duration, usage and outcome
///
/// The operation's result is returned untouched; tracking never turns a
/// success into a failure or the other way round.
pub async fn track_metrics<T, F, Fut>(tracker: &dyn AiTracker, operation: F) -> Result<T>
where
    T: UsageReport,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let started = Instant::now();
    let result = operation().await;
    tracker.track_duration(started.elapsed()).await;

    match &result {
        Ok(value) => {
            tracker.track_success().await;
            if let Some(usage) = value.usage() {
                tracker.track_tokens(usage).await;
            }
        }
        Err(e) => {
            tracing::debug!("Tracked operation failed: {}", e);
            tracker.track_error().await;
        }
    }

    result
}
