//! CLI configuration loading

pub mod loader;

pub use loader::{CliConfig, CliConfigLoader, RawConfig, DEFAULT_BIND};
