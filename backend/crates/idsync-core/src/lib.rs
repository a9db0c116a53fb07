pub mod error;
pub mod models;

pub use error::{CoreError, Result};
pub use models::local_user::{
    LOCKOUT_MINUTES, LocalUser, MAX_FAILED_LOGIN_ATTEMPTS, normalize_email,
};
pub use models::remote_user::RemoteUser;
pub use models::sync_direction::SyncDirection;
pub use models::sync_frequency::SyncFrequency;
pub use models::sync_run::{Discrepancy, RecordFailure, SkipReason, SkippedRecord, SyncRun};
pub use models::sync_schedule::SyncSchedule;
pub use models::webhook_event::{UserRef, WebhookAction, WebhookEvent};

#[cfg(test)]
mod tests;
