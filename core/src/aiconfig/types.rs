//! AI config data model

use crate::config::ModelParams;
use crate::llm::LlmMessage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Model selection of an AI config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Model identifier, e.g. "gpt-4"
    pub name: String,

    /// Free-form model parameters (temperature, maxTokens, ...)
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

/// Provider label of an AI config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpec {
    pub name: String,
}

/// Generation configuration resolved from the config source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub model: Option<ModelSpec>,

    #[serde(default)]
    pub messages: Option<Vec<LlmMessage>>,

    #[serde(default)]
    pub provider: Option<ProviderSpec>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl AiConfig {
    /// Fallback used when the config source has no usable override
    pub fn fallback(model_name: &str, provider_name: &str) -> Self {
        let mut parameters = serde_json::Map::new();
        parameters.insert("temperature".to_string(), serde_json::json!(0.8));

        Self {
            model: Some(ModelSpec {
                name: model_name.to_string(),
                parameters,
            }),
            messages: Some(vec![LlmMessage::system("")]),
            provider: Some(ProviderSpec {
                name: provider_name.to_string(),
            }),
            enabled: true,
        }
    }

    /// Configured model name, if any
    pub fn model_name(&self) -> Option<&str> {
        self.model
            .as_ref()
            .map(|model| model.name.as_str())
            .filter(|name| !name.is_empty())
    }

    /// Model parameters decoded from the parameter map
    pub fn model_params(&self) -> ModelParams {
        self.model
            .as_ref()
            .map(|model| ModelParams::from_parameters(&model.parameters))
            .unwrap_or_default()
    }

    /// Configured messages, or none
    pub fn messages_or_empty(&self) -> Vec<LlmMessage> {
        self.messages.clone().unwrap_or_default()
    }
}

/// The entity a config is evaluated for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationContext {
    pub kind: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EvaluationContext {
    pub fn new(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            key: key.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// A throwaway user context identifying one generation run
    pub fn for_run() -> Self {
        Self::new("user", Uuid::new_v4().to_string()).with_name("DataGenerator")
    }

    /// Look up a built-in attribute by name
    pub fn attribute(&self, name: &str) -> Option<serde_json::Value> {
        match name {
            "key" => Some(serde_json::Value::String(self.key.clone())),
            "kind" => Some(serde_json::Value::String(self.kind.clone())),
            "name" => self.name.clone().map(serde_json::Value::String),
            _ => None,
        }
    }
}

/// Polarity of a synthetic feedback signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Positive,
    Negative,
}

impl FeedbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Positive => "positive",
            FeedbackKind::Negative => "negative",
        }
    }
}

impl std::fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MessageRole;

    #[test]
    fn test_fallback_shape() {
        let config = AiConfig::fallback("gpt-4", "openai");

        assert_eq!(config.model_name(), Some("gpt-4"));
        assert_eq!(config.model_params().temperature, Some(0.8));
        assert_eq!(config.provider.as_ref().unwrap().name, "openai");
        assert!(config.enabled);

        let messages = config.messages_or_empty();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::System);
        assert!(messages[0].content.is_empty());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: AiConfig = serde_json::from_str(r#"{"model":{"name":""}}"#).unwrap();
        assert!(config.enabled);
        assert_eq!(config.model_name(), None);
        assert!(config.messages_or_empty().is_empty());
    }

    #[test]
    fn test_run_contexts_are_unique() {
        let a = EvaluationContext::for_run();
        let b = EvaluationContext::for_run();
        assert_ne!(a.key, b.key);
        assert_eq!(a.kind, "user");
        assert_eq!(a.name.as_deref(), Some("DataGenerator"));
        assert_eq!(a.attribute("name"), Some(serde_json::json!("DataGenerator")));
        assert_eq!(a.attribute("email"), None);
    }
}
