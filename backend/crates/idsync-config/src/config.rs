use crate::{
    CONFIG_DIR_ENV, CONFIG_FILENAME, ConfigError, ConfigErrorResult, DEFAULT_CONFIG_DIRECTORY,
    DatabaseConfig, LocalStoreConfig, LoggingConfig, ProviderConfig, RegistrarConfig, RetryConfig,
    SchedulerConfig, ServerConfig, WebhookConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub provider: ProviderConfig,
    pub webhook: WebhookConfig,
    pub retry: RetryConfig,
    pub registrar: RegistrarConfig,
    pub scheduler: SchedulerConfig,
    pub local_store: LocalStoreConfig,
}

impl Config {
    /// Load config.
    ///
    /// Loading order:
    /// 1. `IDSYNC_CONFIG_DIR`, else `./.idsync/` (created if missing)
    /// 2. `config.toml` in that directory if present, else defaults
    /// 3. `IDSYNC_*` environment overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.clone(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Parse a TOML document without touching the environment
    pub fn from_toml_str(contents: &str) -> ConfigErrorResult<Self> {
        toml::from_str(contents).map_err(|e| ConfigError::Toml {
            path: PathBuf::from("<inline>"),
            source: e,
        })
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Priority: IDSYNC_CONFIG_DIR env var > ./.idsync/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIRECTORY))
    }

    /// Validate all sections. Call after load() to fail fast at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.server.validate()?;
        self.database.validate()?;
        self.provider.validate()?;
        self.retry.validate()?;
        self.registrar.validate()?;
        self.scheduler.validate()?;

        Ok(())
    }

    pub fn database_path(&self) -> ConfigErrorResult<PathBuf> {
        let config_dir = Self::config_dir()?;
        Ok(config_dir.join(&self.database.path))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Log configuration summary (NEVER logs secrets).
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!("  server: {}:{}", self.server.host, self.server.port);
        info!(
            "  database: {} (max {} connections)",
            self.database.path, self.database.max_connections
        );
        info!(
            "  logging: {} (colored: {})",
            *self.logging.level, self.logging.colored
        );
        info!(
            "  provider: {} (service key: {}, timeout={}s, page={}, rps={})",
            self.provider.base_url,
            if self.provider.has_service_key() {
                "set"
            } else {
                "MISSING"
            },
            self.provider.timeout_secs,
            self.provider.page_size,
            self.provider.max_requests_per_second
        );
        info!(
            "  webhook: signature verification {}, sync {}",
            if self.webhook.verification_secret().is_some() {
                "enabled"
            } else {
                "DISABLED"
            },
            if self.webhook.sync_enabled {
                "enabled"
            } else {
                "disabled"
            }
        );
        info!(
            "  retry: retries={}, base={}ms, max={}s, backoff={}x",
            self.retry.max_retries,
            self.retry.base_delay_ms,
            self.retry.max_delay_secs,
            self.retry.backoff_multiplier
        );
        info!(
            "  registrar: {} (grace={}s, attempts={}, delay={}s, every {}s)",
            if self.registrar.enabled {
                "enabled"
            } else {
                "disabled"
            },
            self.registrar.grace_period_secs,
            self.registrar.max_attempts,
            self.registrar.rate_limit_delay_secs,
            self.registrar.sweep_interval_secs
        );
        info!(
            "  scheduler: {} (tick={}s, {} seeded)",
            if self.scheduler.enabled {
                "enabled"
            } else {
                "disabled"
            },
            self.scheduler.tick_secs,
            self.scheduler.schedules.len()
        );
        info!(
            "  local_store: {} delete",
            if self.local_store.soft_delete {
                "soft"
            } else {
                "hard"
            }
        );
    }

    fn apply_env_overrides(&mut self) {
        // Server
        Self::apply_env_string("IDSYNC_SERVER_HOST", &mut self.server.host);
        Self::apply_env_parse("IDSYNC_SERVER_PORT", &mut self.server.port);

        // Database
        Self::apply_env_string("IDSYNC_DATABASE_PATH", &mut self.database.path);
        Self::apply_env_parse(
            "IDSYNC_DATABASE_MAX_CONNECTIONS",
            &mut self.database.max_connections,
        );

        // Logging
        Self::apply_env_parse("IDSYNC_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("IDSYNC_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("IDSYNC_LOG_FILE", &mut self.logging.file);

        // Provider
        Self::apply_env_string("IDSYNC_PROVIDER_URL", &mut self.provider.base_url);
        Self::apply_env_option_string(
            "IDSYNC_PROVIDER_SERVICE_KEY",
            &mut self.provider.service_key,
        );
        Self::apply_env_parse(
            "IDSYNC_PROVIDER_TIMEOUT_SECS",
            &mut self.provider.timeout_secs,
        );
        Self::apply_env_parse("IDSYNC_PROVIDER_PAGE_SIZE", &mut self.provider.page_size);
        Self::apply_env_parse(
            "IDSYNC_PROVIDER_MAX_RPS",
            &mut self.provider.max_requests_per_second,
        );

        // Webhook
        Self::apply_env_option_string("IDSYNC_WEBHOOK_SECRET", &mut self.webhook.secret);
        Self::apply_env_bool("IDSYNC_SYNC_ENABLED", &mut self.webhook.sync_enabled);

        // Retry
        Self::apply_env_parse("IDSYNC_RETRY_MAX_RETRIES", &mut self.retry.max_retries);
        Self::apply_env_parse("IDSYNC_RETRY_BASE_DELAY_MS", &mut self.retry.base_delay_ms);
        Self::apply_env_parse(
            "IDSYNC_RETRY_MAX_DELAY_SECS",
            &mut self.retry.max_delay_secs,
        );
        Self::apply_env_parse(
            "IDSYNC_RETRY_BACKOFF_MULTIPLIER",
            &mut self.retry.backoff_multiplier,
        );
        Self::apply_env_bool("IDSYNC_RETRY_JITTER", &mut self.retry.jitter);

        // Registrar
        Self::apply_env_bool("IDSYNC_REGISTRAR_ENABLED", &mut self.registrar.enabled);
        Self::apply_env_parse(
            "IDSYNC_REGISTRAR_GRACE_PERIOD_SECS",
            &mut self.registrar.grace_period_secs,
        );
        Self::apply_env_parse(
            "IDSYNC_REGISTRAR_MAX_ATTEMPTS",
            &mut self.registrar.max_attempts,
        );
        Self::apply_env_parse(
            "IDSYNC_REGISTRAR_DELAY_SECS",
            &mut self.registrar.rate_limit_delay_secs,
        );
        Self::apply_env_parse(
            "IDSYNC_REGISTRAR_SWEEP_INTERVAL_SECS",
            &mut self.registrar.sweep_interval_secs,
        );

        // Scheduler
        Self::apply_env_bool("IDSYNC_SCHEDULER_ENABLED", &mut self.scheduler.enabled);
        Self::apply_env_parse("IDSYNC_SCHEDULER_TICK_SECS", &mut self.scheduler.tick_secs);

        // Local store
        Self::apply_env_bool("IDSYNC_SOFT_DELETE", &mut self.local_store.soft_delete);
    }

    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Accepts "true"/"1"
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}
