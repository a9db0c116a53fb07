use crate::common::FakeProvider;

use idsync_config::Config;
use idsync_core::LocalUser;
use idsync_db::LocalUserRepository;
use idsync_sync::SyncServices;

use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::SqlitePool;

/// Fast retries and no registrar sleeps
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.retry.max_retries = 2;
    config.retry.base_delay_ms = 1;
    config.retry.max_delay_secs = 1;
    config.retry.jitter = false;
    config.registrar.rate_limit_delay_secs = 0;
    config.registrar.max_attempts = 3;
    config
}

pub struct Harness {
    pub pool: SqlitePool,
    pub users: LocalUserRepository,
    pub provider: Arc<FakeProvider>,
    pub services: SyncServices,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: Config) -> Self {
        Self::with_provider(config, FakeProvider::new()).await
    }

    pub async fn with_provider(config: Config, provider: FakeProvider) -> Self {
        let pool = idsync_db::connect_in_memory()
            .await
            .expect("Failed to create test pool");
        let provider = Arc::new(provider);
        let services = SyncServices::new(pool.clone(), provider.clone(), &config);

        Self {
            users: LocalUserRepository::new(pool.clone()),
            pool,
            provider,
            services,
        }
    }

    pub async fn local(&self, email: &str) -> Option<LocalUser> {
        self.users.find_active_by_email(email).await.unwrap()
    }
}

/// Insert a local user created `age_hours` ago
pub async fn seed_local(
    users: &LocalUserRepository,
    email: &str,
    external_id: Option<&str>,
    verified: bool,
    age_hours: i64,
) -> LocalUser {
    let username = email.split('@').next().unwrap_or("user").to_string();
    let mut user = LocalUser::new(email, username);
    user.external_id = external_id.map(String::from);
    user.verified = verified;
    user.created_at = Utc::now() - Duration::hours(age_hours);
    user.updated_at = user.created_at;
    users.create(&user).await.unwrap();
    user
}
