//! Locally owned user account.
//!
//! The email is the primary join key against the remote provider and is
//! always stored case-folded. `external_id` is the provider's id for the same
//! account once the two records have been linked.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Failed logins before the account is locked
pub const MAX_FAILED_LOGIN_ATTEMPTS: i32 = 5;

/// How long a lock lasts once `MAX_FAILED_LOGIN_ATTEMPTS` is reached
pub const LOCKOUT_MINUTES: i64 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    /// Provider-side id, set once the account is linked
    pub external_id: Option<String>,
    pub verified: bool,
    pub is_admin: bool,
    /// Opaque credential; sync-created accounts get an unusable placeholder
    #[serde(skip_serializing)]
    pub credential: Option<String>,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LocalUser {
    /// Create a new, unverified, unlinked user
    pub fn new(email: &str, username: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            username,
            external_id: None,
            verified: false,
            is_admin: false,
            credential: None,
            failed_login_attempts: 0,
            locked_until: None,
            deleted_at: None,
            last_synced_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }

    /// Count a failed login and lock the account once the limit is reached.
    /// Returns true when this call locked the account.
    pub fn register_failed_login(&mut self, now: DateTime<Utc>) -> bool {
        self.failed_login_attempts += 1;
        self.updated_at = now;

        if self.failed_login_attempts >= MAX_FAILED_LOGIN_ATTEMPTS {
            self.locked_until = Some(now + Duration::minutes(LOCKOUT_MINUTES));
            return true;
        }

        false
    }

    pub fn reset_login_attempts(&mut self) {
        self.failed_login_attempts = 0;
        self.locked_until = None;
    }

    /// Local part of the email, used as the base for generated usernames
    pub fn email_local_part(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

/// Case-fold and trim an email address for storage and comparison
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
