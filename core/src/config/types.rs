//! Resolved configuration types for completion clients
//!
//! Core only accepts fully resolved, validated configuration.
//! Discovery and loading happen in the CLI layer.

use serde::{Deserialize, Serialize};

/// Supported completion protocols
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    /// OpenAI-compatible chat completions API
    #[serde(rename = "openai_compat")]
    OpenAICompat,
    /// Anthropic Messages API
    #[serde(rename = "anthropic")]
    Anthropic,
}

impl Protocol {
    /// Get the default base URL for this protocol
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Protocol::OpenAICompat => "https://api.openai.com/v1",
            Protocol::Anthropic => "https://api.anthropic.com",
        }
    }
}

/// Model parameters for LLM requests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature for sampling
    pub temperature: Option<f32>,
    /// Top-p sampling parameter
    pub top_p: Option<f32>,
    /// Stop sequences
    pub stop_sequences: Option<Vec<String>>,
}

impl ModelParams {
    /// Read parameters out of an AI config parameter map.
    ///
    /// Config sources spell keys in camelCase (`maxTokens`), but snake_case
    /// is accepted too. Values of the wrong type are ignored.
    pub fn from_parameters(parameters: &serde_json::Map<String, serde_json::Value>) -> Self {
        let lookup = |keys: &[&str]| keys.iter().find_map(|key| parameters.get(*key));

        let stop_sequences = lookup(&["stopSequences", "stop_sequences", "stop"])
            .and_then(|value| value.as_array())
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect::<Vec<_>>()
            })
            .filter(|values| !values.is_empty());

        Self {
            max_tokens: lookup(&["maxTokens", "max_tokens"])
                .and_then(|v| v.as_u64())
                .and_then(|v| u32::try_from(v).ok()),
            temperature: lookup(&["temperature"])
                .and_then(|v| v.as_f64())
                .map(|v| v as f32),
            top_p: lookup(&["topP", "top_p"])
                .and_then(|v| v.as_f64())
                .map(|v| v as f32),
            stop_sequences,
        }
    }
}

/// A fully resolved LLM configuration ready for use by core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLlmConfig {
    /// The protocol to use
    pub protocol: Protocol,
    /// Base URL for the API
    pub base_url: String,
    /// API key for authentication
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Model name/identifier
    pub model: String,
    /// Model parameters
    #[serde(default)]
    pub params: ModelParams,
}

impl ResolvedLlmConfig {
    /// Create a new resolved LLM config
    pub fn new(protocol: Protocol, base_url: String, api_key: String, model: String) -> Self {
        Self {
            protocol,
            base_url,
            api_key,
            model,
            params: ModelParams::default(),
        }
    }

    /// Set model parameters
    pub fn with_params(mut self, params: ModelParams) -> Self {
        self.params = params;
        self
    }

    /// Validate the configuration.
    ///
    /// Only connection settings are checked here. Sampling parameters come
    /// from the config source and are left to the provider to accept or reject.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.is_empty() {
            return Err("API key cannot be empty".to_string());
        }

        if self.model.is_empty() {
            return Err("Model name cannot be empty".to_string());
        }

        if self.base_url.is_empty() {
            return Err("Base URL cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("Base URL must start with http:// or https://".to_string());
        }

        Ok(())
    }
}
