//! Run settings and service endpoints

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default time allowed for the config source to initialize
pub const DEFAULT_INIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default pause between two generations
pub const DEFAULT_PACING_DELAY: Duration = Duration::from_secs(1);

/// Default number of queued events that triggers a flush
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Knobs of a generation run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    /// Upper bound on config source initialization
    pub init_timeout: Duration,
    /// Fixed delay between iterations
    pub pacing_delay: Duration,
    /// Extra variables handed to config resolution for prompt interpolation
    pub variables: serde_json::Map<String, serde_json::Value>,
}

impl Default for RunSettings {
    fn default() -> Self {
        let mut variables = serde_json::Map::new();
        variables.insert(
            "example_variable".to_string(),
            serde_json::Value::String("sample".to_string()),
        );

        Self {
            init_timeout: DEFAULT_INIT_TIMEOUT,
            pacing_delay: DEFAULT_PACING_DELAY,
            variables,
        }
    }
}

impl RunSettings {
    /// Override the initialization timeout
    pub fn with_init_timeout(mut self, timeout: Duration) -> Self {
        self.init_timeout = timeout;
        self
    }

    /// Override the pacing delay
    pub fn with_pacing_delay(mut self, delay: Duration) -> Self {
        self.pacing_delay = delay;
        self
    }
}

/// Base URLs of every remote service the generator talks to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// OpenAI-compatible API base (including the `/v1` suffix)
    pub openai_base_url: String,
    /// Anthropic API base
    pub anthropic_base_url: String,
    /// Flag delivery base of the config source
    pub config_sdk_base_url: String,
    /// Event ingestion base of the config source
    pub config_events_base_url: String,
    /// Queued events that trigger a flush
    pub event_capacity: usize,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            openai_base_url: "https://api.openai.com/v1".to_string(),
            anthropic_base_url: "https://api.anthropic.com".to_string(),
            config_sdk_base_url: "https://sdk.launchdarkly.com".to_string(),
            config_events_base_url: "https://events.launchdarkly.com".to_string(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl Endpoints {
    /// Validate that every base URL is usable
    pub fn validate(&self) -> Result<(), String> {
        let urls = [
            ("openai_base_url", &self.openai_base_url),
            ("anthropic_base_url", &self.anthropic_base_url),
            ("config_sdk_base_url", &self.config_sdk_base_url),
            ("config_events_base_url", &self.config_events_base_url),
        ];

        for (field, value) in urls {
            let parsed = url::Url::parse(value).map_err(|e| format!("{}: {}", field, e))?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(format!("{} must start with http:// or https://", field));
            }
        }

        if self.event_capacity == 0 {
            return Err("event_capacity must be at least 1".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = RunSettings::default();
        assert_eq!(settings.init_timeout, Duration::from_secs(10));
        assert_eq!(settings.pacing_delay, Duration::from_secs(1));
        assert_eq!(
            settings.variables.get("example_variable"),
            Some(&serde_json::Value::String("sample".to_string()))
        );
    }

    #[test]
    fn test_endpoints_validation() {
        assert!(Endpoints::default().validate().is_ok());

        let mut endpoints = Endpoints::default();
        endpoints.config_sdk_base_url = "not a url".to_string();
        assert!(endpoints.validate().is_err());

        let mut endpoints = Endpoints::default();
        endpoints.openai_base_url = "file:///tmp".to_string();
        assert!(endpoints.validate().is_err());
    }
}
