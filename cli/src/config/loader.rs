//! Simple CLI configuration loader for datagen
//!
//! Implements single-source priority loading with overrides:
//! 1. --config file/dir (highest priority)
//! 2. Current working directory: ./datagen.json or ./.datagen/config.json
//! 3. XDG config: $XDG_CONFIG_HOME/datagen/config.json or ~/.config/datagen/config.json
//! 4. Built-in defaults (no files)
//!
//! Environment variables are applied on top of the file, then flag overrides.

use anyhow::{anyhow, Context, Result};
use datagen_core::{Endpoints, RunSettings};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Address the HTTP server binds to unless configured otherwise
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

const ENV_BIND: &str = "DATAGEN_BIND";
const ENV_INIT_TIMEOUT_SECS: &str = "DATAGEN_INIT_TIMEOUT_SECS";
const ENV_PACING_DELAY_MS: &str = "DATAGEN_PACING_DELAY_MS";
const ENV_OPENAI_BASE_URL: &str = "DATAGEN_OPENAI_BASE_URL";
const ENV_ANTHROPIC_BASE_URL: &str = "DATAGEN_ANTHROPIC_BASE_URL";
const ENV_LD_SDK_BASE_URL: &str = "DATAGEN_LD_SDK_BASE_URL";
const ENV_LD_EVENTS_BASE_URL: &str = "DATAGEN_LD_EVENTS_BASE_URL";

/// Raw configuration file format; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Server bind address
    pub bind: Option<String>,
    /// Seconds allowed for config source initialization
    pub init_timeout_secs: Option<u64>,
    /// Milliseconds between two generations
    pub pacing_delay_ms: Option<u64>,
    /// Variables handed to prompt interpolation
    pub variables: Option<serde_json::Map<String, serde_json::Value>>,
    /// Queued analytics events that trigger a flush
    pub event_capacity: Option<usize>,
    pub openai_base_url: Option<String>,
    pub anthropic_base_url: Option<String>,
    pub ld_sdk_base_url: Option<String>,
    pub ld_events_base_url: Option<String>,
}

/// Fully resolved CLI configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    pub bind: String,
    pub settings: RunSettings,
    pub endpoints: Endpoints,
}

/// CLI configuration loader
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Flag overrides
    bind_override: Option<String>,
    /// Directory searched for project-local config
    search_dir: Option<PathBuf>,
    /// User-level config directory
    user_config_dir: Option<PathBuf>,
    /// Fixed environment, used instead of the process environment when set
    env: Option<HashMap<String, String>>,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            config_override: None,
            bind_override: None,
            search_dir: None,
            user_config_dir: dirs::config_dir(),
            env: None,
        }
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Set bind address override
    pub fn with_bind_override(mut self, bind: String) -> Self {
        self.bind_override = Some(bind);
        self
    }

    /// Search `dir` instead of the current working directory
    pub fn with_search_dir(mut self, dir: PathBuf) -> Self {
        self.search_dir = Some(dir);
        self
    }

    /// Set the user-level config directory (`None` disables it)
    pub fn with_user_config_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.user_config_dir = dir;
        self
    }

    /// Read overrides from `env` instead of the process environment
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    /// Load and resolve configuration
    pub async fn load(&self) -> Result<CliConfig> {
        // Step 1: Find and load base configuration
        let mut config = if let Some(override_path) = &self.config_override {
            self.load_from_path(override_path).await.with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            })?
        } else {
            self.search_and_load().await?
        };

        // Step 2: Apply environment overrides
        self.apply_env(&mut config)?;

        // Step 3: Apply flag overrides
        if let Some(bind) = &self.bind_override {
            config.bind = Some(bind.clone());
        }

        // Step 4: Resolve to final config
        self.resolve_config(config)
    }

    /// Search for config in priority order
    async fn search_and_load(&self) -> Result<RawConfig> {
        // 1. Current working directory
        if let Some(config) = self.try_load_cwd().await? {
            return Ok(config);
        }

        // 2. XDG config directory
        if let Some(config) = self.try_load_xdg().await? {
            return Ok(config);
        }

        // 3. Defaults only
        tracing::debug!("No config file found, using defaults");
        Ok(RawConfig::default())
    }

    /// Try loading from current working directory
    async fn try_load_cwd(&self) -> Result<Option<RawConfig>> {
        let cwd = match &self.search_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };

        // Try ./datagen.json first
        let datagen_json = cwd.join("datagen.json");
        if datagen_json.exists() {
            return Ok(Some(self.load_file(&datagen_json).await?));
        }

        // Try ./.datagen/config.json
        let datagen_dir_config = cwd.join(".datagen").join("config.json");
        if datagen_dir_config.exists() {
            return Ok(Some(self.load_file(&datagen_dir_config).await?));
        }

        Ok(None)
    }

    /// Try loading from XDG config directory
    async fn try_load_xdg(&self) -> Result<Option<RawConfig>> {
        if let Some(config_dir) = &self.user_config_dir {
            let config_path = config_dir.join("datagen").join("config.json");
            if config_path.exists() {
                return Ok(Some(self.load_file(&config_path).await?));
            }
        }
        Ok(None)
    }

    /// Load configuration from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<RawConfig> {
        if path.is_file() {
            self.load_file(path).await
        } else if path.is_dir() {
            let config_file = path.join("config.json");
            if config_file.exists() {
                self.load_file(&config_file).await
            } else {
                Err(anyhow!(
                    "No config.json found in directory: {}",
                    path.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", path.display()))
        }
    }

    /// Load a single config file
    async fn load_file(&self, path: &Path) -> Result<RawConfig> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        tracing::debug!("Loaded config file: {}", path.display());
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn env_var(&self, name: &str) -> Option<String> {
        let value = match &self.env {
            Some(env) => env.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    fn env_number<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>> {
        match self.env_var(name) {
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| anyhow!("Environment variable {} is not a valid number: {}", name, value)),
            None => Ok(None),
        }
    }

    /// Apply DATAGEN_* environment variables
    fn apply_env(&self, config: &mut RawConfig) -> Result<()> {
        if let Some(bind) = self.env_var(ENV_BIND) {
            config.bind = Some(bind);
        }
        if let Some(secs) = self.env_number(ENV_INIT_TIMEOUT_SECS)? {
            config.init_timeout_secs = Some(secs);
        }
        if let Some(ms) = self.env_number(ENV_PACING_DELAY_MS)? {
            config.pacing_delay_ms = Some(ms);
        }

        let urls = [
            (ENV_OPENAI_BASE_URL, &mut config.openai_base_url),
            (ENV_ANTHROPIC_BASE_URL, &mut config.anthropic_base_url),
            (ENV_LD_SDK_BASE_URL, &mut config.ld_sdk_base_url),
            (ENV_LD_EVENTS_BASE_URL, &mut config.ld_events_base_url),
        ];
        for (name, slot) in urls {
            if let Some(url) = self.env_var(name) {
                *slot = Some(url);
            }
        }

        Ok(())
    }

    /// Resolve raw config to settings and endpoints
    fn resolve_config(&self, config: RawConfig) -> Result<CliConfig> {
        let mut settings = RunSettings::default();
        if let Some(secs) = config.init_timeout_secs {
            if secs == 0 {
                return Err(anyhow!("init_timeout_secs must be at least 1"));
            }
            settings = settings.with_init_timeout(Duration::from_secs(secs));
        }
        if let Some(ms) = config.pacing_delay_ms {
            settings = settings.with_pacing_delay(Duration::from_millis(ms));
        }
        if let Some(variables) = config.variables {
            settings.variables = variables;
        }

        let mut endpoints = Endpoints::default();
        if let Some(url) = config.openai_base_url {
            endpoints.openai_base_url = url;
        }
        if let Some(url) = config.anthropic_base_url {
            endpoints.anthropic_base_url = url;
        }
        if let Some(url) = config.ld_sdk_base_url {
            endpoints.config_sdk_base_url = url;
        }
        if let Some(url) = config.ld_events_base_url {
            endpoints.config_events_base_url = url;
        }
        if let Some(capacity) = config.event_capacity {
            endpoints.event_capacity = capacity;
        }

        endpoints
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        Ok(CliConfig {
            bind: config.bind.unwrap_or_else(|| DEFAULT_BIND.to_string()),
            settings,
            endpoints,
        })
    }
}

impl Default for CliConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
