use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Config error: {0}")]
    Config(#[from] idsync_config::ConfigError),

    #[error("Logging error: {0}")]
    Logging(#[from] idsync_logging::LoggingError),
}

pub type Result<T> = std::result::Result<T, ServerError>;
