use crate::{
    CleanupService, DeletionCoordinator, LocalWriter, Metrics, RateLimitAwareRegistrar,
    ReconciliationEngine, RegistrarOptions, RemoteDirectory, RetryPolicy, ScheduleManager,
    UserLocks, WebhookReceiver,
};

use idsync_config::Config;
use idsync_db::{LocalUserRepository, SyncScheduleRepository};
use idsync_provider::IdentityProvider;

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

/// Every sync component wired against one pool and one provider client.
/// Built once per process; the lock registry is shared by all of them.
#[derive(Clone)]
pub struct SyncServices {
    pub engine: Arc<ReconciliationEngine>,
    pub webhooks: Arc<WebhookReceiver>,
    pub schedules: Arc<ScheduleManager>,
    pub registrar: Arc<RateLimitAwareRegistrar>,
    pub deletion: Arc<DeletionCoordinator>,
    pub cleanup: Arc<CleanupService>,
    pub locks: UserLocks,
    pub metrics: Metrics,
}

impl SyncServices {
    pub fn new(pool: SqlitePool, provider: Arc<dyn IdentityProvider>, config: &Config) -> Self {
        let retry = RetryPolicy::from(&config.retry);
        let locks = UserLocks::new();
        let metrics = Metrics::new();

        let users = LocalUserRepository::new(pool.clone());
        let writer = LocalWriter::new(users.clone(), config.local_store.soft_delete);
        let directory = RemoteDirectory::new(provider, retry.clone());

        let engine = Arc::new(ReconciliationEngine::new(
            writer.clone(),
            directory.clone(),
            locks.clone(),
            metrics.clone(),
        ));

        let deletion = DeletionCoordinator::new(
            directory.clone(),
            writer.clone(),
            locks.clone(),
            metrics.clone(),
        );

        let schedules = Arc::new(ScheduleManager::new(
            SyncScheduleRepository::new(pool),
            Arc::clone(&engine),
            Duration::from_secs(config.scheduler.stale_lock_secs),
            metrics.clone(),
        ));

        let registrar = Arc::new(RateLimitAwareRegistrar::new(
            users.clone(),
            directory.clone(),
            locks.clone(),
            metrics.clone(),
            RegistrarOptions::from(&config.registrar),
        ));

        let webhooks = Arc::new(WebhookReceiver::new(
            config.webhook.clone(),
            writer,
            locks.clone(),
            retry,
            metrics.clone(),
        ));

        let cleanup = Arc::new(CleanupService::new(users, directory, deletion.clone()));

        Self {
            engine,
            webhooks,
            schedules,
            registrar,
            deletion: Arc::new(deletion),
            cleanup,
            locks,
            metrics,
        }
    }
}
