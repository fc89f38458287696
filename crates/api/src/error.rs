//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use saga::{SagaError, Workflow};
use thiserror::Error;

/// Response text for a registration that was rolled back cleanly.
pub const REVERTED_MESSAGE: &str = "Registration failed. The operation was reverted.";

/// Response text for a registration whose rollback failed.
pub const ROLLBACK_FAILED_MESSAGE: &str =
    "Critical failure while rolling back a failed registration.";

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request from the client.
    #[error("{0}")]
    BadRequest(String),
    /// Orchestrated workflow error.
    #[error(transparent)]
    Saga(#[from] SagaError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Saga(err) => saga_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

/// Store details stay in the logs; clients get a generic message.
fn saga_error_to_response(err: SagaError) -> (StatusCode, String) {
    match err {
        SagaError::Validation(e) => (StatusCode::BAD_REQUEST, e.message),
        SagaError::CitizenNotFound(_) => (StatusCode::NOT_FOUND, "Citizen not found.".to_string()),
        SagaError::Store { workflow, .. } => {
            tracing::error!(error = %err, "store failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                failure_message(workflow).to_string(),
            )
        }
        SagaError::Reverted { .. } => {
            tracing::warn!(error = %err, "registration reverted");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                REVERTED_MESSAGE.to_string(),
            )
        }
        SagaError::RollbackFailed { ref failures, .. } => {
            tracing::error!(
                error = %err,
                failed_compensations = failures.len(),
                "registration rollback failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ROLLBACK_FAILED_MESSAGE.to_string(),
            )
        }
        SagaError::Projection(_) => {
            tracing::error!(error = %err, "inconsistent stored records");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error.".to_string(),
            )
        }
    }
}

fn failure_message(workflow: Workflow) -> &'static str {
    match workflow {
        Workflow::Register => "Failed to register citizen.",
        Workflow::List => "Failed to retrieve citizens.",
        Workflow::Read => "Failed to retrieve citizen.",
        Workflow::Update => "Failed to update citizen.",
        Workflow::Delete => "Failed to delete citizen.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::EntityKind;
    use domain::ValidationError;
    use registry_store::StoreError;
    use saga::RegistrationStep;

    fn unavailable() -> StoreError {
        StoreError::Unavailable {
            entity: EntityKind::Address,
            operation: "create",
        }
    }

    #[test]
    fn test_validation_message_is_passed_through() {
        let err = SagaError::Validation(ValidationError::new("street", "street is required."));
        assert_eq!(
            saga_error_to_response(err),
            (StatusCode::BAD_REQUEST, "street is required.".to_string())
        );
    }

    #[test]
    fn test_store_detail_is_not_leaked() {
        let err = SagaError::store(Workflow::Read, "fetch_address", unavailable());
        let (status, message) = saga_error_to_response(err);

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Failed to retrieve citizen.");
    }

    #[test]
    fn test_reverted_and_rollback_failed_are_distinct() {
        let reverted = SagaError::Reverted {
            step: RegistrationStep::CreateAddress,
            source: unavailable(),
        };
        let rollback_failed = SagaError::RollbackFailed {
            step: RegistrationStep::CreateAddress,
            source: unavailable(),
            failures: Vec::new(),
        };

        let (_, reverted) = saga_error_to_response(reverted);
        let (_, rollback_failed) = saga_error_to_response(rollback_failed);
        assert_eq!(reverted, REVERTED_MESSAGE);
        assert_eq!(rollback_failed, ROLLBACK_FAILED_MESSAGE);
    }
}
