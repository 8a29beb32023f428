//! Configuration module for datagen core
//!
//! Only exports pure data types. All loading logic is in CLI layer.

pub mod settings;
pub mod types;

pub use settings::{Endpoints, RunSettings};
pub use types::{ModelParams, Protocol, ResolvedLlmConfig};
