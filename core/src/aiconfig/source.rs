//! Config source seam

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::tracker::AiTracker;
use super::types::{AiConfig, EvaluationContext};

/// An AI config together with the tracker its telemetry goes to
pub struct ResolvedAiConfig {
    pub config: AiConfig,
    pub tracker: Arc<dyn AiTracker>,
}

impl std::fmt::Debug for ResolvedAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedAiConfig")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A session with the service that serves AI configs and collects telemetry
///
/// One session belongs to exactly one run.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Establish the session; callers bound this with a timeout
    async fn initialize(&mut self) -> Result<()>;

    /// Resolve `config_key` for `context`, falling back to `fallback`
    async fn resolve_config(
        &self,
        config_key: &str,
        context: &EvaluationContext,
        fallback: AiConfig,
        variables: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<ResolvedAiConfig>;

    /// Flush pending telemetry and release the session
    async fn close(&self) -> Result<()>;
}

/// Opens config source sessions from a service key
pub trait ConfigSourceConnector: Send + Sync {
    fn connect(&self, service_key: &str) -> Result<Box<dyn ConfigSource>>;
}
