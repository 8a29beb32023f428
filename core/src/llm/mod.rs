//! LLM client abstractions and implementations

pub mod client;
pub mod factory;
pub mod message;
pub mod providers;

pub use client::{ChatOptions, FinishReason, LlmClient, LlmResponse, Usage};
pub use factory::{create_client, CompletionClientFactory, HttpClientFactory};
pub use message::{LlmMessage, MessageRole};
pub use providers::*;
