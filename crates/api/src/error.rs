//! Unified error handling for the API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use ledgerflow_core::UserId;

use crate::storage::StorageError;
use crate::validation::FieldError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body failed validation.
    #[error("{message}")]
    Validation {
        /// Summary message (e.g., "Invalid store data").
        message: String,
        /// Every violated field.
        errors: Vec<FieldError>,
    },

    /// No authenticated session.
    #[error("Unauthorized")]
    Unauthenticated,

    /// Authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body: `{message, errors?}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        let server_error = match &self {
            Self::Storage(StorageError::NotFound | StorageError::Conflict(_)) => false,
            Self::Storage(_) | Self::Internal(_) => true,
            _ => false,
        };
        if server_error {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "API request error"
            );
        }

        let status = match &self {
            Self::Validation { .. } | Self::Storage(StorageError::Conflict(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) | Self::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let (message, errors) = match self {
            Self::Validation { message, errors } => (message, Some(errors)),
            Self::Storage(StorageError::NotFound) => ("Not found".to_string(), None),
            Self::Storage(StorageError::Conflict(message)) => (message, None),
            Self::Storage(_) | Self::Internal(_) => ("Internal server error".to_string(), None),
            other => (other.to_string(), None),
        };

        (status, Json(ErrorBody { message, errors })).into_response()
    }
}

/// Set the Sentry user context from an authenticated user.
pub fn set_sentry_user(user_id: UserId, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
