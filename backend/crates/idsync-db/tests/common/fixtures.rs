use idsync_core::{LocalUser, SyncDirection, SyncFrequency, SyncSchedule};

use chrono::{DateTime, Utc};

/// Unlinked, unverified user with a username derived from the email
pub fn create_test_user(email: &str) -> LocalUser {
    let username = email.split('@').next().unwrap_or("user").to_string();
    LocalUser::new(email, username)
}

pub fn create_test_schedule(frequency: SyncFrequency, next_run_at: DateTime<Utc>) -> SyncSchedule {
    SyncSchedule::new(SyncDirection::Bidirectional, frequency, false, next_run_at)
}
