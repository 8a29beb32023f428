//! Analytics event queue and the AI config tracker built on it

use crate::aiconfig::{AiTracker, EvaluationContext, FeedbackKind};
use crate::error::{ConfigSourceError, Result};
use crate::llm::Usage;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const EVENT_SCHEMA_VERSION: &str = "4";

pub const DURATION_EVENT: &str = "$ld:ai:duration:total";
pub const TOKENS_TOTAL_EVENT: &str = "$ld:ai:tokens:total";
pub const TOKENS_INPUT_EVENT: &str = "$ld:ai:tokens:input";
pub const TOKENS_OUTPUT_EVENT: &str = "$ld:ai:tokens:output";
pub const GENERATION_EVENT: &str = "$ld:ai:generation";
pub const GENERATION_SUCCESS_EVENT: &str = "$ld:ai:generation:success";
pub const GENERATION_ERROR_EVENT: &str = "$ld:ai:generation:error";
pub const FEEDBACK_POSITIVE_EVENT: &str = "$ld:ai:feedback:user:positive";
pub const FEEDBACK_NEGATIVE_EVENT: &str = "$ld:ai:feedback:user:negative";

/// Buffers analytics events and posts them in batches
pub struct EventQueue {
    http: reqwest::Client,
    bulk_url: String,
    sdk_key: String,
    capacity: usize,
    pending: Mutex<Vec<Value>>,
}

impl EventQueue {
    pub fn new(http: reqwest::Client, events_base_url: &str, sdk_key: &str, capacity: usize) -> Self {
        Self {
            http,
            bulk_url: format!("{}/bulk", events_base_url.trim_end_matches('/')),
            sdk_key: sdk_key.to_string(),
            capacity: capacity.max(1),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Queue an event, flushing once the buffer is full
    pub async fn push(&self, event: Value) {
        let full = {
            let mut pending = self.pending.lock().await;
            pending.push(event);
            pending.len() >= self.capacity
        };

        if full {
            if let Err(e) = self.flush().await {
                tracing::warn!("Dropping analytics events: {}", e);
            }
        }
    }

    /// Number of events waiting to be sent
    pub async fn pending_len(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Send every queued event; a failed batch is dropped
    pub async fn flush(&self) -> Result<()> {
        let batch = std::mem::take(&mut *self.pending.lock().await);
        if batch.is_empty() {
            return Ok(());
        }

        tracing::debug!("Flushing {} analytics events", batch.len());
        let response = self
            .http
            .post(&self.bulk_url)
            .header("Authorization", &self.sdk_key)
            .header("X-LaunchDarkly-Event-Schema", EVENT_SCHEMA_VERSION)
            .json(&batch)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ConfigSourceError::EventDelivery {
                message: format!("events endpoint returned {}", response.status()),
            }
            .into());
        }

        Ok(())
    }

    /// Queue an index event announcing a context
    pub async fn index(&self, context: &EvaluationContext) {
        self.push(json!({
            "kind": "index",
            "creationDate": Utc::now().timestamp_millis(),
            "context": context,
        }))
        .await;
    }
}

/// Tracker that turns telemetry calls into custom analytics events
pub struct LdTracker {
    queue: Arc<EventQueue>,
    context: EvaluationContext,
    config_key: String,
    variation_key: String,
    version: u64,
}

impl LdTracker {
    pub fn new(
        queue: Arc<EventQueue>,
        context: EvaluationContext,
        config_key: &str,
        variation_key: &str,
        version: u64,
    ) -> Self {
        Self {
            queue,
            context,
            config_key: config_key.to_string(),
            variation_key: variation_key.to_string(),
            version,
        }
    }

    async fn custom(&self, key: &str, metric_value: f64) {
        let mut context_keys = serde_json::Map::new();
        context_keys.insert(self.context.kind.clone(), json!(self.context.key));

        self.queue
            .push(json!({
                "kind": "custom",
                "creationDate": Utc::now().timestamp_millis(),
                "key": key,
                "contextKeys": context_keys,
                "data": {
                    "configKey": self.config_key,
                    "variationKey": self.variation_key,
                    "version": self.version,
                },
                "metricValue": metric_value,
            }))
            .await;
    }
}

#[async_trait]
impl AiTracker for LdTracker {
    async fn track_duration(&self, duration: Duration) {
        self.custom(DURATION_EVENT, duration.as_millis() as f64).await;
    }

    async fn track_tokens(&self, usage: Usage) {
        if usage.total_tokens > 0 {
            self.custom(TOKENS_TOTAL_EVENT, usage.total_tokens as f64).await;
        }
        if usage.prompt_tokens > 0 {
            self.custom(TOKENS_INPUT_EVENT, usage.prompt_tokens as f64).await;
        }
        if usage.completion_tokens > 0 {
            self.custom(TOKENS_OUTPUT_EVENT, usage.completion_tokens as f64)
                .await;
        }
    }

    async fn track_success(&self) {
        self.custom(GENERATION_EVENT, 1.0).await;
        self.custom(GENERATION_SUCCESS_EVENT, 1.0).await;
    }

    async fn track_error(&self) {
        self.custom(GENERATION_EVENT, 1.0).await;
        self.custom(GENERATION_ERROR_EVENT, 1.0).await;
    }

    async fn track_feedback(&self, kind: FeedbackKind) -> Result<()> {
        let key = match kind {
            FeedbackKind::Positive => FEEDBACK_POSITIVE_EVENT,
            FeedbackKind::Negative => FEEDBACK_NEGATIVE_EVENT,
        };
        self.custom(key, 1.0).await;
        Ok(())
    }
}
