//! Domain error types.

use thiserror::Error;

/// A client payload failed a structural rule.
///
/// Only the first violated rule is reported. The message is meant to be shown
/// to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// The offending field, in its wire spelling.
    pub field: &'static str,
    /// Human-readable reason.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}
