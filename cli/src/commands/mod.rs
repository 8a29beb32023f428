//! CLI command implementations

pub mod run;
pub mod serve;

pub use run::{run_command, RunArgs};
pub use serve::serve_command;

use crate::config::CliConfig;
use datagen_core::{HttpClientFactory, LaunchDarklyConnector, Orchestrator};
use std::sync::Arc;

/// Wire the orchestrator to the real config source and completion APIs
pub(crate) fn build_orchestrator(config: &CliConfig) -> Orchestrator {
    Orchestrator::new(
        Arc::new(LaunchDarklyConnector::new(config.endpoints.clone())),
        Arc::new(HttpClientFactory::new(config.endpoints.clone())),
        config.settings.clone(),
    )
}
