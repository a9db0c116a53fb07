use crate::{ConfigError, ConfigErrorResult};

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:54321";

pub const MIN_TIMEOUT_SECS: u64 = 1;
pub const MAX_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const MIN_PAGE_SIZE: u32 = 1;
pub const MAX_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_PAGE_SIZE: u32 = 100;

pub const MAX_REQUESTS_PER_SECOND: u32 = 1000;
/// 0 disables the client-side limiter
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 0;

/// Remote identity provider admin API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Project URL; the admin API lives under `/auth/v1/admin`
    pub base_url: String,
    /// Service-role key sent as `apikey` and bearer token. Never logged.
    pub service_key: Option<String>,
    pub timeout_secs: u64,
    /// Users fetched per listing page
    pub page_size: u32,
    pub max_requests_per_second: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            service_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
            max_requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
        }
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::provider(format!(
                "provider.base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }

        if self.timeout_secs < MIN_TIMEOUT_SECS || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::provider(format!(
                "provider.timeout_secs must be {}-{}, got {}",
                MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS, self.timeout_secs
            )));
        }

        if self.page_size < MIN_PAGE_SIZE || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::provider(format!(
                "provider.page_size must be {}-{}, got {}",
                MIN_PAGE_SIZE, MAX_PAGE_SIZE, self.page_size
            )));
        }

        if self.max_requests_per_second > MAX_REQUESTS_PER_SECOND {
            return Err(ConfigError::provider(format!(
                "provider.max_requests_per_second must be 0-{}, got {}",
                MAX_REQUESTS_PER_SECOND, self.max_requests_per_second
            )));
        }

        Ok(())
    }

    pub fn has_service_key(&self) -> bool {
        self.service_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}
