//! Storage error types
//!
//! Defines all errors that can occur in the storage layer.

use thiserror::Error;

use crate::schedule::{MedicationId, ScheduleError};

/// Errors that can occur in the medication store
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Requested medication does not exist in the user's list
    #[error("Medication {id} not found for user {user_id}")]
    NotFound { user_id: String, id: MedicationId },

    /// Two records in one list share an id
    #[error("Duplicate medication id: {0}")]
    DuplicateId(MedicationId),

    /// User id cannot be used as a storage key
    #[error("Invalid user id: {0:?}")]
    InvalidUser(String),

    /// Submitted medication failed validation
    #[error(transparent)]
    Validation(#[from] ScheduleError),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::NotFound {
            user_id: "alice".to_string(),
            id: 42,
        };
        assert_eq!(err.to_string(), "Medication 42 not found for user alice");

        let err = StorageError::InvalidUser("../etc".to_string());
        assert_eq!(err.to_string(), "Invalid user id: \"../etc\"");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let storage_err: StorageError = io_err.into();
        assert!(matches!(storage_err, StorageError::Io(_)));
    }

    #[test]
    fn test_validation_is_transparent() {
        let err: StorageError = ScheduleError::Validation("Name is required".to_string()).into();
        assert_eq!(err.to_string(), "Name is required");
    }
}
