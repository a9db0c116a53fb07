use idsync_config::ConfigError;
use idsync_db::DbError;
use idsync_logging::LoggingError;
use idsync_provider::ProviderError;
use idsync_sync::SyncError;

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Config error: {source} {location}")]
    Config {
        #[source]
        source: ConfigError,
        location: ErrorLocation,
    },

    #[error("Database error: {source} {location}")]
    Db {
        #[source]
        source: DbError,
        location: ErrorLocation,
    },

    #[error("Provider error: {source} {location}")]
    Provider {
        #[source]
        source: ProviderError,
        location: ErrorLocation,
    },

    #[error("{source}")]
    Sync {
        #[source]
        source: SyncError,
        location: ErrorLocation,
    },

    #[error("Invalid argument: {message} {location}")]
    InvalidArgument {
        message: String,
        location: ErrorLocation,
    },

    #[error("Aborted: {message}")]
    Aborted { message: String },

    #[error("I/O error: {message} {location}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Failed to serialize output: {source} {location}")]
    Output {
        #[source]
        source: serde_json::Error,
        location: ErrorLocation,
    },

    #[error("Logging error: {source} {location}")]
    Logging {
        #[source]
        source: LoggingError,
        location: ErrorLocation,
    },
}

impl CliError {
    #[track_caller]
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn io<S: Into<String>>(message: S, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for CliError {
    #[track_caller]
    fn from(source: ConfigError) -> Self {
        Self::Config {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<DbError> for CliError {
    #[track_caller]
    fn from(source: DbError) -> Self {
        Self::Db {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ProviderError> for CliError {
    #[track_caller]
    fn from(source: ProviderError) -> Self {
        Self::Provider {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<SyncError> for CliError {
    #[track_caller]
    fn from(source: SyncError) -> Self {
        Self::Sync {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<LoggingError> for CliError {
    #[track_caller]
    fn from(source: LoggingError) -> Self {
        Self::Logging {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for CliError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        Self::Output {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<uuid::Error> for CliError {
    #[track_caller]
    fn from(e: uuid::Error) -> Self {
        Self::invalid_argument(format!("Invalid schedule id: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
