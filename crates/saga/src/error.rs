//! Saga error types.

use domain::ValidationError;
use projections::ProjectionError;
use registry_store::StoreError;
use thiserror::Error;

use crate::events::Workflow;
use crate::ledger::Compensation;
use crate::registration::RegistrationStep;

/// A compensating delete that failed during rollback.
#[derive(Debug)]
pub struct CompensationFailure {
    pub compensation: Compensation,
    pub error: StoreError,
}

/// Errors that can occur during orchestrated workflows.
#[derive(Debug, Error)]
pub enum SagaError {
    /// The payload failed validation; no store was called.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No citizen exists under the given key.
    #[error("Citizen not found: {0}")]
    CitizenNotFound(String),

    /// A store call failed in a forward-only workflow.
    #[error("{workflow} failed at {step}: {source}")]
    Store {
        workflow: Workflow,
        step: &'static str,
        source: StoreError,
    },

    /// A registration step failed and every committed step was undone.
    #[error("Registration step '{step}' failed and was reverted: {source}")]
    Reverted {
        step: RegistrationStep,
        source: StoreError,
    },

    /// A registration step failed and at least one compensation failed too.
    #[error(
        "Registration step '{step}' failed and {} compensation(s) failed: {source}",
        .failures.len()
    )]
    RollbackFailed {
        step: RegistrationStep,
        source: StoreError,
        failures: Vec<CompensationFailure>,
    },

    /// Stored records could not be combined.
    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),
}

impl SagaError {
    pub fn store(workflow: Workflow, step: &'static str, source: StoreError) -> Self {
        SagaError::Store {
            workflow,
            step,
            source,
        }
    }

    /// True when the stores were left inconsistent.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SagaError::RollbackFailed { .. })
    }
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
