//! Projection error types.

use common::{CitizenId, EntityKind};
use thiserror::Error;

/// Errors that can occur while assembling a composite record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// A dependent record belongs to a different citizen.
    #[error("{entity} owned by citizen {actual} cannot be attached to citizen {expected}")]
    OwnerMismatch {
        entity: EntityKind,
        expected: CitizenId,
        actual: CitizenId,
    },
}

impl ProjectionError {
    /// The dependent kind that could not be attached.
    pub fn entity(&self) -> EntityKind {
        match self {
            ProjectionError::OwnerMismatch { entity, .. } => *entity,
        }
    }
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
