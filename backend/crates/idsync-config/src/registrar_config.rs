use crate::{ConfigError, ConfigErrorResult};

use serde::Deserialize;

pub const DEFAULT_GRACE_PERIOD_SECS: u64 = 5 * 60;

pub const MIN_MAX_ATTEMPTS: u32 = 1;
pub const MAX_MAX_ATTEMPTS: u32 = 20;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

pub const MAX_RATE_LIMIT_DELAY_SECS: u64 = 300;
pub const DEFAULT_RATE_LIMIT_DELAY_SECS: u64 = 5;

pub const DEFAULT_AUTO_CONFIRM_AFTER_SECS: u64 = 24 * 60 * 60;

pub const MIN_SWEEP_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 5 * 60;

/// Deferred remote registration of local accounts that could not be
/// registered at signup time.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistrarConfig {
    /// Run the periodic sweep inside the server
    pub enabled: bool,
    /// Accounts younger than this are left alone
    pub grace_period_secs: u64,
    pub max_attempts: u32,
    /// Fixed sleep after a rate-limited attempt
    pub rate_limit_delay_secs: u64,
    /// Accounts older than this are created pre-confirmed
    pub auto_confirm_after_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            grace_period_secs: DEFAULT_GRACE_PERIOD_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            rate_limit_delay_secs: DEFAULT_RATE_LIMIT_DELAY_SECS,
            auto_confirm_after_secs: DEFAULT_AUTO_CONFIRM_AFTER_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

impl RegistrarConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.max_attempts < MIN_MAX_ATTEMPTS || self.max_attempts > MAX_MAX_ATTEMPTS {
            return Err(ConfigError::config(format!(
                "registrar.max_attempts must be {}-{}, got {}",
                MIN_MAX_ATTEMPTS, MAX_MAX_ATTEMPTS, self.max_attempts
            )));
        }

        if self.rate_limit_delay_secs > MAX_RATE_LIMIT_DELAY_SECS {
            return Err(ConfigError::config(format!(
                "registrar.rate_limit_delay_secs must be 0-{}, got {}",
                MAX_RATE_LIMIT_DELAY_SECS, self.rate_limit_delay_secs
            )));
        }

        if self.sweep_interval_secs < MIN_SWEEP_INTERVAL_SECS {
            return Err(ConfigError::config(format!(
                "registrar.sweep_interval_secs must be >= {}, got {}",
                MIN_SWEEP_INTERVAL_SECS, self.sweep_interval_secs
            )));
        }

        Ok(())
    }
}
