//! Provider error taxonomy.
//!
//! Every failed admin-API call is classified once, here. Callers branch on
//! the class: transient failures are retried with backoff, rate limits with
//! a fixed delay, "already exists" and "not found" feed self-healing paths,
//! and "permission denied" triggers the disable fallback on deletion.

use std::panic::Location;

use error_location::ErrorLocation;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    /// Timeout, connection failure, or 5xx
    #[error("Transient provider failure: {message} {location}")]
    Transient {
        message: String,
        status: Option<u16>,
        location: ErrorLocation,
    },

    #[error("Provider rate limit hit: {message} {location}")]
    RateLimited {
        message: String,
        location: ErrorLocation,
    },

    #[error("User already exists: {message} {location}")]
    AlreadyExists {
        message: String,
        location: ErrorLocation,
    },

    #[error("User not found: {message} {location}")]
    NotFound {
        message: String,
        location: ErrorLocation,
    },

    #[error("Operation not permitted: {message} {location}")]
    PermissionDenied {
        message: String,
        location: ErrorLocation,
    },

    /// Any other 4xx
    #[error("Request rejected ({status}): {message} {location}")]
    Rejected {
        status: u16,
        message: String,
        location: ErrorLocation,
    },

    #[error("Unexpected provider response: {message} {location}")]
    Decode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Provider misconfigured: {message} {location}")]
    Configuration {
        message: String,
        location: ErrorLocation,
    },
}

impl ProviderError {
    /// Classify a non-success HTTP response
    #[track_caller]
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = extract_message(body);
        let lowered = format!("{} {}", message, body).to_lowercase();
        let location = ErrorLocation::from(Location::caller());

        if status == 429 || lowered.contains("rate limit") {
            return Self::RateLimited { message, location };
        }

        if lowered.contains("already registered")
            || lowered.contains("already been registered")
            || lowered.contains("already exists")
            || lowered.contains("email_exists")
        {
            return Self::AlreadyExists { message, location };
        }

        match status {
            404 => Self::NotFound { message, location },
            401 | 403 => Self::PermissionDenied { message, location },
            408 | 500..=599 => Self::Transient {
                message,
                status: Some(status),
                location,
            },
            _ if lowered.contains("not allowed") || lowered.contains("not_admin") => {
                Self::PermissionDenied { message, location }
            }
            _ => Self::Rejected {
                status,
                message,
                location,
            },
        }
    }

    /// Transport-level failure
    #[track_caller]
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let location = ErrorLocation::from(Location::caller());

        if err.is_decode() {
            return Self::Decode {
                message: err.to_string(),
                location,
            };
        }

        if err.is_builder() {
            return Self::Configuration {
                message: err.to_string(),
                location,
            };
        }

        Self::Transient {
            message: err.to_string(),
            status: err.status().map(|s| s.as_u16()),
            location,
        }
    }

    #[track_caller]
    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::Decode {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn transient<S: Into<String>>(message: S) -> Self {
        Self::Transient {
            message: message.into(),
            status: None,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Worth retrying with exponential backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    /// Short machine-readable class, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transient { .. } => "transient",
            Self::RateLimited { .. } => "rate_limited",
            Self::AlreadyExists { .. } => "already_exists",
            Self::NotFound { .. } => "not_found",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::Rejected { .. } => "rejected",
            Self::Decode { .. } => "decode",
            Self::Configuration { .. } => "configuration",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        ProviderError::from_reqwest(err)
    }
}

/// Pull a human-readable message out of a provider error body
fn extract_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        for key in ["msg", "message", "error_description", "error", "error_code"] {
            if let Some(text) = json.get(key).and_then(Value::as_str) {
                return text.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.to_string()
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
