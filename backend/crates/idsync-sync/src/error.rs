use idsync_core::CoreError;
use idsync_db::DbError;
use idsync_provider::ProviderError;

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Invalid webhook signature: {message} {location}")]
    SignatureInvalid {
        message: String,
        location: ErrorLocation,
    },

    #[error("Malformed payload: {message} {location}")]
    MalformedPayload {
        message: String,
        location: ErrorLocation,
    },

    #[error("{source}")]
    Provider {
        #[source]
        source: ProviderError,
        location: ErrorLocation,
    },

    #[error("{source}")]
    Db {
        #[source]
        source: DbError,
        location: ErrorLocation,
    },

    #[error("{source}")]
    Core {
        #[source]
        source: CoreError,
        location: ErrorLocation,
    },

    #[error("{operation} still failing after {attempts} attempts: {message} {location}")]
    RetryExhausted {
        operation: String,
        attempts: u32,
        message: String,
        location: ErrorLocation,
    },

    #[error("Remote deletion failed for {email}: {message} {location}")]
    RemoteDeletionFailed {
        email: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Not found: {message} {location}")]
    NotFound {
        message: String,
        location: ErrorLocation,
    },

    #[error("Validation failed: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },
}

impl SyncError {
    #[track_caller]
    pub fn signature<S: Into<String>>(message: S) -> Self {
        Self::SignatureInvalid {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedPayload {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn remote_deletion_failed(email: &str, cause: &SyncError) -> Self {
        Self::RemoteDeletionFailed {
            email: email.to_string(),
            message: cause.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Wrap the last error of an exhausted retry loop
    #[track_caller]
    pub fn retry_exhausted(operation: &str, attempts: u32, cause: &SyncError) -> Self {
        Self::RetryExhausted {
            operation: operation.to_string(),
            attempts,
            message: cause.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Transient provider failure or a busy/locked database
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider { source, .. } => source.is_retryable(),
            Self::Db { source, .. } => source.is_transient(),
            _ => false,
        }
    }

    /// Caller's fault; redelivering the same request cannot succeed
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::SignatureInvalid { .. }
            | Self::MalformedPayload { .. }
            | Self::Validation { .. } => true,
            Self::Core { source, .. } => matches!(
                source,
                CoreError::MalformedPayload { .. }
                    | CoreError::Json { .. }
                    | CoreError::Validation { .. }
            ),
            _ => false,
        }
    }

    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Short class name used for metrics labels and API error codes
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SignatureInvalid { .. } => "signature_invalid",
            Self::MalformedPayload { .. } => "malformed_payload",
            Self::Provider { source, .. } => source.kind(),
            Self::Db { .. } => "database",
            Self::Core { .. } => "malformed_payload",
            Self::RetryExhausted { .. } => "retry_exhausted",
            Self::RemoteDeletionFailed { .. } => "remote_deletion_failed",
            Self::NotFound { .. } => "not_found",
            Self::Validation { .. } => "validation",
        }
    }
}

impl From<ProviderError> for SyncError {
    #[track_caller]
    fn from(source: ProviderError) -> Self {
        Self::Provider {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<DbError> for SyncError {
    #[track_caller]
    fn from(source: DbError) -> Self {
        Self::Db {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<CoreError> for SyncError {
    #[track_caller]
    fn from(source: CoreError) -> Self {
        Self::Core {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
