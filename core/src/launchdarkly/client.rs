//! LaunchDarkly-compatible config source

use crate::aiconfig::{
    AiConfig, ConfigSource, ConfigSourceConnector, EvaluationContext, MessageInterpolator,
    ResolvedAiConfig,
};
use crate::config::Endpoints;
use crate::error::{ConfigError, ConfigSourceError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::events::{EventQueue, LdTracker};
use super::flags::FlagData;

/// Tracking metadata embedded in an AI config variation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigMeta {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    variation_key: String,
    #[serde(default = "default_version")]
    version: u64,
}

fn default_version() -> u64 {
    1
}

/// Opens one [`LaunchDarklySource`] per run, sharing the HTTP pool
#[derive(Debug, Clone)]
pub struct LaunchDarklyConnector {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl LaunchDarklyConnector {
    pub fn new(endpoints: Endpoints) -> Self {
        Self::with_http_client(endpoints, reqwest::Client::new())
    }

    pub fn with_http_client(endpoints: Endpoints, http: reqwest::Client) -> Self {
        Self { http, endpoints }
    }
}

impl ConfigSourceConnector for LaunchDarklyConnector {
    fn connect(&self, service_key: &str) -> Result<Box<dyn ConfigSource>> {
        if service_key.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "sdk_key".to_string(),
            }
            .into());
        }

        Ok(Box::new(LaunchDarklySource::new(
            self.http.clone(),
            &self.endpoints,
            service_key,
        )))
    }
}

/// A session against the flag delivery and event endpoints
pub struct LaunchDarklySource {
    http: reqwest::Client,
    sdk_base_url: String,
    sdk_key: String,
    flags: Option<FlagData>,
    events: Arc<EventQueue>,
    interpolator: MessageInterpolator,
}

impl LaunchDarklySource {
    pub fn new(http: reqwest::Client, endpoints: &Endpoints, sdk_key: &str) -> Self {
        let events = Arc::new(EventQueue::new(
            http.clone(),
            &endpoints.config_events_base_url,
            sdk_key,
            endpoints.event_capacity,
        ));

        Self {
            http,
            sdk_base_url: endpoints.config_sdk_base_url.trim_end_matches('/').to_string(),
            sdk_key: sdk_key.to_string(),
            flags: None,
            events,
            interpolator: MessageInterpolator::new(),
        }
    }

    /// Evaluate `config_key` and decode it, or `None` if the fallback applies
    fn evaluate(
        &self,
        flags: &FlagData,
        config_key: &str,
        context: &EvaluationContext,
    ) -> Option<(AiConfig, ConfigMeta)> {
        let Some(flag) = flags.flags.get(config_key) else {
            tracing::warn!("AI config '{}' not found, using fallback", config_key);
            return None;
        };

        let Some(evaluation) = flag.evaluate(context) else {
            tracing::warn!("AI config '{}' served no variation, using fallback", config_key);
            return None;
        };

        match decode_variation(evaluation.value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(
                    "AI config '{}' variation {} is malformed ({}), using fallback",
                    config_key,
                    evaluation.variation_index,
                    e
                );
                None
            }
        }
    }
}

fn decode_variation(value: &Value) -> std::result::Result<(AiConfig, ConfigMeta), serde_json::Error> {
    let meta: ConfigMeta = match value.get("_ldMeta") {
        Some(meta) => serde_json::from_value(meta.clone())?,
        None => ConfigMeta::default(),
    };
    let mut config: AiConfig = serde_json::from_value(value.clone())?;
    config.enabled = meta.enabled;
    Ok((config, meta))
}

#[async_trait]
impl ConfigSource for LaunchDarklySource {
    async fn initialize(&mut self) -> Result<()> {
        let url = format!("{}/sdk/latest-all", self.sdk_base_url);
        tracing::debug!("Fetching flag data from {}", url);

        let response = self
            .http
            .get(&url)
            .header("Authorization", &self.sdk_key)
            .header("User-Agent", format!("datagen/{}", crate::VERSION))
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ConfigSourceError::Authentication {
                message: format!("SDK key rejected ({})", status),
            }
            .into());
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ConfigSourceError::UnexpectedResponse {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let flags: FlagData = response.json().await?;
        tracing::info!("Config source initialized with {} flags", flags.flags.len());
        self.flags = Some(flags);
        Ok(())
    }

    async fn resolve_config(
        &self,
        config_key: &str,
        context: &EvaluationContext,
        fallback: AiConfig,
        variables: &serde_json::Map<String, Value>,
    ) -> Result<ResolvedAiConfig> {
        let flags = self.flags.as_ref().ok_or(ConfigSourceError::NotInitialized)?;

        self.events.index(context).await;

        let (mut config, meta) = self
            .evaluate(flags, config_key, context)
            .unwrap_or_else(|| {
                let meta = ConfigMeta {
                    enabled: fallback.enabled,
                    ..Default::default()
                };
                (fallback, meta)
            });

        if let Some(messages) = config.messages.take() {
            config.messages = Some(self.interpolator.render(messages, context, variables)?);
        }

        let tracker = LdTracker::new(
            self.events.clone(),
            context.clone(),
            config_key,
            &meta.variation_key,
            meta.version,
        );

        Ok(ResolvedAiConfig {
            config,
            tracker: Arc::new(tracker),
        })
    }

    async fn close(&self) -> Result<()> {
        self.events.flush().await
    }
}
