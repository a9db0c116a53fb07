//! REST API error types
//!
//! Every failure leaves the service as `{"error": {"code", "message"}}` with
//! a matching status code. Internal details stay in the log.

use idsync_db::DbError;
use idsync_sync::SyncError;

use std::panic::Location;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use error_location::ErrorLocation;
use serde::Serialize;
use thiserror::Error;

const INTERNAL_MESSAGE: &str = "Internal error; the request may be retried";

/// JSON error response body
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    /// Machine-readable error code (e.g., "NOT_FOUND", "INVALID_SIGNATURE")
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// 404
    #[error("Resource not found: {message} {location}")]
    NotFound {
        message: String,
        location: ErrorLocation,
    },

    /// 400
    #[error("Validation failed: {message} {location}")]
    Validation {
        message: String,
        field: Option<String>,
        location: ErrorLocation,
    },

    /// 400; the sender must not redeliver
    #[error("Invalid signature: {message} {location}")]
    InvalidSignature {
        message: String,
        location: ErrorLocation,
    },

    /// 400; the sender must not redeliver
    #[error("Malformed payload: {message} {location}")]
    MalformedPayload {
        message: String,
        location: ErrorLocation,
    },

    /// 500; webhook senders redeliver on this status
    #[error("Internal error: {message} {location}")]
    Internal {
        message: String,
        location: ErrorLocation,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        log::error!("{}", self);

        let (status, body) = match self {
            ApiError::NotFound { message, .. } => (
                StatusCode::NOT_FOUND,
                ApiErrorBody {
                    code: "NOT_FOUND".into(),
                    message,
                    field: None,
                },
            ),
            ApiError::Validation { message, field, .. } => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "VALIDATION_ERROR".into(),
                    message,
                    field,
                },
            ),
            ApiError::InvalidSignature { message, .. } => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "INVALID_SIGNATURE".into(),
                    message,
                    field: None,
                },
            ),
            ApiError::MalformedPayload { message, .. } => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "MALFORMED_PAYLOAD".into(),
                    message,
                    field: None,
                },
            ),
            ApiError::Internal { message, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    code: "INTERNAL_ERROR".into(),
                    message,
                    field: None,
                },
            ),
        };

        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

impl From<SyncError> for ApiError {
    #[track_caller]
    fn from(e: SyncError) -> Self {
        let location = ErrorLocation::from(Location::caller());

        match e {
            SyncError::SignatureInvalid { message, .. } => {
                ApiError::InvalidSignature { message, location }
            }
            SyncError::MalformedPayload { message, .. } => {
                ApiError::MalformedPayload { message, location }
            }
            SyncError::Validation { message, .. } => ApiError::Validation {
                message,
                field: None,
                location,
            },
            SyncError::NotFound { message, .. } => ApiError::NotFound { message, location },
            other if other.is_client_error() => {
                log::warn!("Rejected payload: {}", other);
                ApiError::MalformedPayload {
                    message: "Request body could not be decoded".to_string(),
                    location,
                }
            }
            other => {
                log::error!("Sync error ({}): {}", other.kind(), other);
                ApiError::Internal {
                    message: INTERNAL_MESSAGE.to_string(),
                    location,
                }
            }
        }
    }
}

impl From<DbError> for ApiError {
    #[track_caller]
    fn from(e: DbError) -> Self {
        // Don't expose internal database details to clients
        log::error!("Database error: {}", e);
        ApiError::Internal {
            message: "Database operation failed".to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<uuid::Error> for ApiError {
    #[track_caller]
    fn from(e: uuid::Error) -> Self {
        ApiError::Validation {
            message: format!("Invalid UUID format: {}", e),
            field: Some("id".to_string()),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
