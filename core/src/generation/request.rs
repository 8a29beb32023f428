//! Generation request model

use crate::config::Protocol;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Largest run the request boundary accepts
pub const MAX_GENERATIONS: u32 = 1000;

/// Completion provider selected by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(alias = "anthropic")]
    Claude,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::Claude => "claude",
        }
    }

    /// Model used when the config source does not name one
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "gpt-4",
            ProviderId::Claude => "claude-2",
        }
    }

    /// Wire protocol spoken by this provider
    pub fn protocol(&self) -> Protocol {
        match self {
            ProviderId::OpenAi => Protocol::OpenAICompat,
            ProviderId::Claude => Protocol::Anthropic,
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderId::OpenAi),
            "claude" | "anthropic" => Ok(ProviderId::Claude),
            _ => Err(ConfigError::UnsupportedProvider {
                provider: s.to_string(),
            }),
        }
    }
}

/// Everything one run needs, supplied by the caller
#[derive(Clone, PartialEq)]
pub struct GenerationRequest {
    pub provider: ProviderId,
    pub api_key: String,
    pub config_service_key: String,
    pub config_id: String,
    pub total_count: u32,
    pub good_feedback_percent: f64,
}

impl std::fmt::Debug for GenerationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationRequest")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("config_service_key", &"<redacted>")
            .field("config_id", &self.config_id)
            .field("total_count", &self.total_count)
            .field("good_feedback_percent", &self.good_feedback_percent)
            .finish()
    }
}

impl GenerationRequest {
    /// Check the preconditions of a run
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("api_key", &self.api_key),
            ("config_service_key", &self.config_service_key),
            ("config_id", &self.config_id),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: field.to_string(),
                });
            }
        }

        if !(1..=MAX_GENERATIONS).contains(&self.total_count) {
            return Err(ConfigError::InvalidValue {
                field: "total_count".to_string(),
                value: format!("{} (expected 1..={})", self.total_count, MAX_GENERATIONS),
            });
        }

        if !self.good_feedback_percent.is_finite()
            || !(0.0..=100.0).contains(&self.good_feedback_percent)
        {
            return Err(ConfigError::InvalidValue {
                field: "good_feedback_percent".to_string(),
                value: format!("{} (expected 0..=100)", self.good_feedback_percent),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            provider: ProviderId::OpenAi,
            api_key: "sk-secret".to_string(),
            config_service_key: "sdk-secret".to_string(),
            config_id: "support-bot".to_string(),
            total_count: 10,
            good_feedback_percent: 80.0,
        }
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("openai".parse::<ProviderId>().unwrap(), ProviderId::OpenAi);
        assert_eq!("Claude".parse::<ProviderId>().unwrap(), ProviderId::Claude);
        assert_eq!("anthropic".parse::<ProviderId>().unwrap(), ProviderId::Claude);
        assert!("gemini".parse::<ProviderId>().is_err());
    }

    #[test]
    fn test_provider_defaults() {
        assert_eq!(ProviderId::OpenAi.default_model(), "gpt-4");
        assert_eq!(ProviderId::Claude.default_model(), "claude-2");
        assert_eq!(ProviderId::Claude.protocol(), Protocol::Anthropic);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", request());
        assert!(!debug.contains("sk-secret"));
        assert!(!debug.contains("sdk-secret"));
        assert!(debug.contains("support-bot"));
    }

    #[test]
    fn test_validate_bounds() {
        assert!(request().validate().is_ok());

        let mut zero = request();
        zero.total_count = 0;
        assert!(zero.validate().is_err());

        let mut too_many = request();
        too_many.total_count = MAX_GENERATIONS + 1;
        assert!(too_many.validate().is_err());

        let mut ratio = request();
        ratio.good_feedback_percent = 100.5;
        assert!(ratio.validate().is_err());

        ratio.good_feedback_percent = f64::NAN;
        assert!(ratio.validate().is_err());

        let mut blank = request();
        blank.api_key = " ".to_string();
        assert!(matches!(
            blank.validate(),
            Err(ConfigError::MissingField { field }) if field == "api_key"
        ));
    }
}
