mod config;
mod database_config;
mod error;
mod local_store_config;
mod log_level;
mod logging_config;
mod provider_config;
mod registrar_config;
mod retry_config;
mod scheduler_config;
mod server_config;
mod webhook_config;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use database_config::DatabaseConfig;
pub use error::{ConfigError, ConfigErrorResult};
pub use local_store_config::LocalStoreConfig;
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use provider_config::ProviderConfig;
pub use registrar_config::RegistrarConfig;
pub use retry_config::RetryConfig;
pub use scheduler_config::{ScheduleSeed, SchedulerConfig};
pub use server_config::ServerConfig;
pub use webhook_config::{PLACEHOLDER_WEBHOOK_SECRET, WebhookConfig};

const CONFIG_DIR_ENV: &str = "IDSYNC_CONFIG_DIR";
const DEFAULT_CONFIG_DIRECTORY: &str = ".idsync";
const CONFIG_FILENAME: &str = "config.toml";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const MIN_PORT: u16 = 1024;
const DEFAULT_DATABASE_FILENAME: &str = "idsync.db";
const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";
