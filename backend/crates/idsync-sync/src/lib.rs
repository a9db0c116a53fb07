//! Reconciliation of the local user store with the remote identity provider.

pub mod cancellation;
pub mod cleanup;
pub mod conflict;
pub mod credentials;
pub mod deletion;
pub mod error;
pub mod local_writer;
pub mod metrics;
pub mod reconcile;
pub mod registrar;
pub mod remote_directory;
pub mod retry;
pub mod schedule;
pub mod services;
pub mod shutdown_coordinator;
pub mod shutdown_guard;
pub mod signature;
pub mod user_locks;
pub mod webhook;

pub use cancellation::CancellationSignal;
pub use cleanup::{CleanReport, CleanupReport, CleanupService, CleanupStore};
pub use conflict::{ConflictResolver, LocalUserPatch, Resolution};
pub use deletion::{
    DELETION_STRATEGIES, DeletionCoordinator, DeletionReport, DeletionStrategy, RemoteDeletion,
};
pub use error::{Result, SyncError};
pub use local_writer::{LocalWriter, UpsertOutcome};
pub use metrics::Metrics;
pub use reconcile::{ReconciliationEngine, SyncOptions};
pub use registrar::{RateLimitAwareRegistrar, RegistrarOptions, RegistrationReport};
pub use remote_directory::RemoteDirectory;
pub use retry::{IsRetryable, RetryPolicy, execute_with_retry};
pub use schedule::{
    ScheduleManager, SchedulePatch, ScheduleRunOutcome, ScheduleRunStatus,
    WEEKLY_DAYS_AHEAD_ON_MONDAY, compute_next_run,
};
pub use services::SyncServices;
pub use shutdown_coordinator::ShutdownCoordinator;
pub use shutdown_guard::ShutdownGuard;
pub use signature::{compute_signature, verify_signature};
pub use user_locks::UserLocks;
pub use webhook::{
    UNKNOWN_REQUEST_ID, WebhookDelivery, WebhookOutcome, WebhookReceiver, WebhookStatus,
};

#[cfg(test)]
mod tests;
