//! Single run command

use anyhow::{bail, Result};
use clap::Args;
use datagen_core::generation::{GenerationRequest, ProviderId};
use tracing::info;

use crate::config::CliConfigLoader;
use crate::server::payload::GenerateResponse;

/// Arguments of a single run from the command line
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Completion provider (openai, claude)
    #[arg(long)]
    pub provider: ProviderId,

    /// Completion provider API key
    #[arg(long, env = "DATAGEN_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Config source SDK key
    #[arg(long, env = "DATAGEN_SDK_KEY", hide_env_values = true)]
    pub sdk_key: String,

    /// AI config key to resolve
    #[arg(long)]
    pub config_id: String,

    /// Number of generations
    #[arg(long, default_value_t = 100)]
    pub count: u32,

    /// Percentage of generations that get positive feedback
    #[arg(long, default_value_t = 80.0)]
    pub good_ratio: f64,
}

/// Execute one run and print the same JSON the endpoint returns
pub async fn run_command(args: RunArgs, config_loader: CliConfigLoader) -> Result<()> {
    let config = config_loader.load().await?;

    let request = GenerationRequest {
        provider: args.provider,
        api_key: args.api_key,
        config_service_key: args.sdk_key,
        config_id: args.config_id,
        total_count: args.count,
        good_feedback_percent: args.good_ratio,
    };
    request.validate()?;
    info!("Running {} generation(s) with {}", request.total_count, request.provider);

    let orchestrator = super::build_orchestrator(&config);
    let response = GenerateResponse::from(orchestrator.run(request).await);
    println!("{}", serde_json::to_string_pretty(&response)?);

    if let GenerateResponse::Failed { error, .. } = &response {
        bail!("Generation failed: {}", error);
    }
    Ok(())
}
