//! Composite citizen projection.
//!
//! This crate maps between the externally visible "full citizen" shape and
//! the three per-entity records:
//! - [`CompositeRecord`] assembles a citizen with its optional credential and
//!   domicile for responses
//! - [`CompositePayload`] splits a request body into the per-entity inputs
//!   the validation gate checks

pub mod composite;
pub mod error;
pub mod payload;

pub use composite::CompositeRecord;
pub use error::{ProjectionError, Result};
pub use payload::CompositePayload;
