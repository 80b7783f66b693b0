//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::fhir::FhirError;
use crate::interactions::InteractionError;
use crate::schedule::ScheduleError;
use crate::storage::StorageError;
use crate::users::AuthError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("{0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing, unknown or expired session
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Login or user-list error
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Storage layer error
    #[error("{0}")]
    Storage(#[from] StorageError),

    /// Interaction checker error
    #[error("{0}")]
    Interaction(#[from] InteractionError),

    /// FHIR file or server error
    #[error("FHIR error: {0}")]
    Fhir(#[from] FhirError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Service unavailable (dependency down)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ScheduleError> for ApiError {
    fn from(e: ScheduleError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::Validation(e.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        ApiError::Validation(e.body_text())
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    /// HTTP status and machine-readable code
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Auth(e) => match e {
                AuthError::MissingUser | AuthError::MissingPassword => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
                }
                AuthError::UnknownUser(_) | AuthError::InvalidSession => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
                }
                AuthError::Io { .. } | AuthError::Parse { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "USER_LIST_ERROR")
                }
            },
            ApiError::Storage(e) => match e {
                StorageError::NotFound { .. } => (StatusCode::NOT_FOUND, "MEDICATION_NOT_FOUND"),
                StorageError::Validation(_) | StorageError::InvalidUser(_) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
                }
                StorageError::DuplicateId(_) => (StatusCode::CONFLICT, "DUPLICATE_ID"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            },
            ApiError::Interaction(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERACTION_ERROR"),
            ApiError::Fhir(e) => match e {
                FhirError::InvalidBundle(_) | FhirError::InvalidJson { .. } => {
                    (StatusCode::BAD_REQUEST, "INVALID_BUNDLE")
                }
                FhirError::FileNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                _ => (StatusCode::BAD_GATEWAY, "FHIR_SERVER_ERROR"),
            },
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let request_id = uuid::Uuid::new_v4().to_string();

        // Client mistakes are routine; only server-side failures are errors
        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found = ApiError::Storage(StorageError::NotFound {
            user_id: "1".to_string(),
            id: 7,
        });
        assert_eq!(not_found.status_and_code().0, StatusCode::NOT_FOUND);

        let invalid = ApiError::from(ScheduleError::Validation(
            "Please fill in all required fields (Name, Dosage, Start Date)".to_string(),
        ));
        assert_eq!(invalid.status_and_code().0, StatusCode::BAD_REQUEST);
        assert_eq!(
            invalid.to_string(),
            "Please fill in all required fields (Name, Dosage, Start Date)"
        );

        let no_key = ApiError::Interaction(InteractionError::MissingApiKey);
        assert_eq!(no_key.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);

        let password = ApiError::Auth(AuthError::MissingPassword);
        assert_eq!(password.status_and_code().0, StatusCode::BAD_REQUEST);
        assert_eq!(password.to_string(), "Please enter a password");
    }
}
