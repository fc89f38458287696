use common::EntityKind;
use thiserror::Error;

/// Errors that can occur when interacting with an entity store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists under the given key.
    #[error("{entity} not found: {key}")]
    NotFound { entity: EntityKind, key: String },

    /// A uniqueness rule was violated (business key, folio, or one
    /// dependent per citizen).
    #[error("{entity} already exists: {key}")]
    Duplicate { entity: EntityKind, key: String },

    /// The store refused or failed the call.
    #[error("{entity} store unavailable during {operation}")]
    Unavailable {
        entity: EntityKind,
        operation: &'static str,
    },

    /// A stored row could not be turned back into a record.
    #[error("Invalid {entity} record: {reason}")]
    InvalidRecord { entity: EntityKind, reason: String },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub fn not_found(entity: EntityKind, key: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn duplicate(entity: EntityKind, key: impl ToString) -> Self {
        StoreError::Duplicate {
            entity,
            key: key.to_string(),
        }
    }

    /// Returns true when the error only signals absence.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
