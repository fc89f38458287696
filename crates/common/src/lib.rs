//! Shared identifiers used across the citizen registry crates.

pub mod types;

pub use types::{CitizenId, EntityKind};
