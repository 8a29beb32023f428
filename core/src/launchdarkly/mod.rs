//! LaunchDarkly-compatible config source: flag delivery, evaluation and
//! analytics events

pub mod client;
pub mod events;
pub mod flags;

pub use client::{LaunchDarklyConnector, LaunchDarklySource};
pub use events::{EventQueue, LdTracker};
pub use flags::{Flag, FlagData};
