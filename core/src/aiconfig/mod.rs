//! AI config model, config source seam and telemetry tracking

pub mod interpolate;
pub mod source;
pub mod tracker;
pub mod types;

pub use interpolate::MessageInterpolator;
pub use source::{ConfigSource, ConfigSourceConnector, ResolvedAiConfig};
pub use tracker::{track_metrics, AiTracker, UsageReport};
pub use types::{AiConfig, EvaluationContext, FeedbackKind, ModelSpec, ProviderSpec};
