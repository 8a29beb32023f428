//! Construction of completion clients for a run

use crate::config::{Endpoints, ModelParams, Protocol, ResolvedLlmConfig};
use crate::error::{ConfigError, Result};
use crate::llm::{AnthropicClient, LlmClient, OpenAiClient};
use std::sync::Arc;

/// Create a client for a resolved configuration on top of `http`
pub fn create_client(
    config: &ResolvedLlmConfig,
    http: &reqwest::Client,
) -> Result<Arc<dyn LlmClient>> {
    config.validate().map_err(|message| ConfigError::InvalidValue {
        field: "llm".to_string(),
        value: message,
    })?;

    let client: Arc<dyn LlmClient> = match config.protocol {
        Protocol::OpenAICompat => Arc::new(OpenAiClient::with_http_client(config, http.clone())?),
        Protocol::Anthropic => Arc::new(AnthropicClient::with_http_client(config, http.clone())?),
    };
    Ok(client)
}

/// Builds a completion client once the model of a run is known
pub trait CompletionClientFactory: Send + Sync {
    fn create(
        &self,
        protocol: Protocol,
        api_key: &str,
        model: &str,
        params: ModelParams,
    ) -> Result<Arc<dyn LlmClient>>;
}

/// Factory for the real provider APIs.
///
/// Every client it builds shares one connection pool.
#[derive(Debug, Clone, Default)]
pub struct HttpClientFactory {
    endpoints: Endpoints,
    http: reqwest::Client,
}

impl HttpClientFactory {
    pub fn new(endpoints: Endpoints) -> Self {
        Self::with_http_client(endpoints, reqwest::Client::new())
    }

    pub fn with_http_client(endpoints: Endpoints, http: reqwest::Client) -> Self {
        Self { endpoints, http }
    }

    fn base_url(&self, protocol: &Protocol) -> &str {
        match protocol {
            Protocol::OpenAICompat => &self.endpoints.openai_base_url,
            Protocol::Anthropic => &self.endpoints.anthropic_base_url,
        }
    }
}

impl CompletionClientFactory for HttpClientFactory {
    fn create(
        &self,
        protocol: Protocol,
        api_key: &str,
        model: &str,
        params: ModelParams,
    ) -> Result<Arc<dyn LlmClient>> {
        let base_url = self.base_url(&protocol).to_string();
        let config =
            ResolvedLlmConfig::new(protocol, base_url, api_key.to_string(), model.to_string())
                .with_params(params);
        create_client(&config, &self.http)
    }
}
