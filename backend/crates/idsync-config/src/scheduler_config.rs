use crate::{ConfigError, ConfigErrorResult};

use idsync_core::{SyncDirection, SyncFrequency};

use serde::Deserialize;

pub const MIN_TICK_SECS: u64 = 5;
pub const MAX_TICK_SECS: u64 = 3600;
pub const DEFAULT_TICK_SECS: u64 = 60;

pub const MIN_STALE_LOCK_SECS: u64 = 60;
pub const MAX_STALE_LOCK_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_STALE_LOCK_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Run the periodic driver inside the server
    pub enabled: bool,
    pub tick_secs: u64,
    /// A schedule lock older than this is considered abandoned
    pub stale_lock_secs: u64,
    /// Inserted at startup when no schedules exist yet
    pub schedules: Vec<ScheduleSeed>,
}

/// `[[scheduler.schedules]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleSeed {
    pub direction: SyncDirection,
    pub frequency: SyncFrequency,
    #[serde(default)]
    pub force_update: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_secs: DEFAULT_TICK_SECS,
            stale_lock_secs: DEFAULT_STALE_LOCK_SECS,
            schedules: Vec::new(),
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.tick_secs < MIN_TICK_SECS || self.tick_secs > MAX_TICK_SECS {
            return Err(ConfigError::scheduler(format!(
                "scheduler.tick_secs must be {}-{}, got {}",
                MIN_TICK_SECS, MAX_TICK_SECS, self.tick_secs
            )));
        }

        if self.stale_lock_secs < MIN_STALE_LOCK_SECS || self.stale_lock_secs > MAX_STALE_LOCK_SECS
        {
            return Err(ConfigError::scheduler(format!(
                "scheduler.stale_lock_secs must be {}-{}, got {}",
                MIN_STALE_LOCK_SECS, MAX_STALE_LOCK_SECS, self.stale_lock_secs
            )));
        }

        Ok(())
    }
}
