//! # datagen CLI
//!
//! Command-line interface and HTTP service for datagen, a generator of
//! synthetic AI config traffic.
//!
//! ## Usage
//!
//! - `datagen serve` - Start the HTTP service (`POST /api/generate`)
//! - `datagen run --provider openai --config-id my-config` - Execute a single run

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod server;

use commands::{run_command, serve_command, RunArgs};
use config::CliConfigLoader;

/// datagen - Synthetic generation and feedback traffic for AI configs
#[derive(Parser)]
#[command(name = "datagen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate completions and synthetic feedback for LaunchDarkly AI configs")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP service
    Serve {
        /// Address to bind, e.g. 127.0.0.1:3000
        #[arg(long)]
        bind: Option<String>,
    },

    /// Execute a single generation run
    Run(RunArgs),
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Commands::Serve {
        bind: Some(bind), ..
    } = &cli.command
    {
        loader = loader.with_bind_override(bind.clone());
    }

    loader
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over the verbosity flag
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_loader = build_config_loader(&cli);

    match cli.command {
        Commands::Serve { .. } => serve_command(config_loader).await,
        Commands::Run(args) => run_command(args, config_loader).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_arguments_parse() {
        let cli = Cli::try_parse_from([
            "datagen",
            "-v",
            "run",
            "--provider",
            "claude",
            "--api-key",
            "sk-1",
            "--sdk-key",
            "sdk-1",
            "--config-id",
            "support-bot",
            "--count",
            "5",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.provider, datagen_core::ProviderId::Claude);
                assert_eq!(args.count, 5);
                assert_eq!(args.good_ratio, 80.0);
            }
            Commands::Serve { .. } => panic!("expected run"),
        }
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let result = Cli::try_parse_from([
            "datagen",
            "run",
            "--provider",
            "gemini",
            "--api-key",
            "k",
            "--sdk-key",
            "s",
            "--config-id",
            "c",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_serve_accepts_bind_and_global_config() {
        let cli = Cli::try_parse_from(["datagen", "serve", "--bind", "0.0.0.0:8080", "-c", "x.json"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.json")));
        assert!(matches!(cli.command, Commands::Serve { bind: Some(ref b) } if b == "0.0.0.0:8080"));
    }
}
