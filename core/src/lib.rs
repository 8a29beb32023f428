//! # datagen Core
//!
//! Core library for datagen, a generator of synthetic AI config traffic.
//!
//! A run resolves an AI config from a LaunchDarkly-compatible config source,
//! calls a completion provider a fixed number of times and reports metrics plus
//! a requested split of positive and negative feedback back to the source.

// Core modules
pub mod aiconfig;
pub mod config;
pub mod error;
pub mod generation;
pub mod launchdarkly;
pub mod llm;

// Re-export commonly used types
pub use aiconfig::{AiConfig, AiTracker, ConfigSource, ConfigSourceConnector, FeedbackKind};
pub use config::{Endpoints, ModelParams, Protocol, ResolvedLlmConfig, RunSettings};
pub use error::{Error, Result};
pub use generation::{GenerationRequest, GenerationResult, Orchestrator, ProviderId};
pub use launchdarkly::LaunchDarklyConnector;
pub use llm::{CompletionClientFactory, HttpClientFactory};

/// Current version of the datagen-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
