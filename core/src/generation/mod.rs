//! Synthetic generation runs with feedback reporting

pub mod orchestrator;
pub mod plan;
pub mod request;

pub use orchestrator::{GenerationResult, Orchestrator, Pacer, TokioPacer, DEFAULT_MODEL};
pub use plan::{positive_target, RunState, UNKNOWN_ERROR};
pub use request::{GenerationRequest, ProviderId, MAX_GENERATIONS};
