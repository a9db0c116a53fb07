//! Precedence rules when the two stores disagree about one user.
//!
//! The remote provider is authoritative for confirmation state, email and
//! external id. A remote "unconfirmed" never downgrades a locally verified
//! user; pushing local verification to the remote side happens only in an
//! explicit to-remote run, never here.

use idsync_core::{Discrepancy, LocalUser, RemoteUser};

use chrono::{DateTime, Utc};

/// Field changes to bring a local record in line with the remote one.
/// Empty means already in sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalUserPatch {
    pub email: Option<String>,
    pub external_id: Option<String>,
    pub verified: Option<bool>,
}

impl LocalUserPatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.external_id.is_none() && self.verified.is_none()
    }

    pub fn apply(&self, user: &mut LocalUser, now: DateTime<Utc>) {
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(external_id) = &self.external_id {
            user.external_id = Some(external_id.clone());
        }
        if let Some(verified) = self.verified {
            user.verified = verified;
        }
        user.last_synced_at = Some(now);
        user.updated_at = now;
    }

    /// Human-readable list of the changed fields
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(email) = &self.email {
            parts.push(format!("email -> {}", email));
        }
        if let Some(external_id) = &self.external_id {
            parts.push(format!("external_id -> {}", external_id));
        }
        if self.verified == Some(true) {
            parts.push("verified".to_string());
        }
        parts.join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub patch: LocalUserPatch,
    /// Set when both sides were linked, but to different ids
    pub discrepancy: Option<Discrepancy>,
}

pub struct ConflictResolver;

impl ConflictResolver {
    pub fn resolve(local: &LocalUser, remote: &RemoteUser) -> Resolution {
        let mut patch = LocalUserPatch::default();
        let mut discrepancy = None;

        if let Some(remote_email) = remote.normalized_email()
            && remote_email != local.email
        {
            patch.email = Some(remote_email);
        }

        match local.external_id.as_deref() {
            Some(current) if current == remote.id => {}
            Some(current) => {
                log::warn!(
                    "External id mismatch for {}: local={} remote={}, remote wins",
                    local.email,
                    current,
                    remote.id
                );
                discrepancy = Some(Discrepancy {
                    email: local.email.clone(),
                    local_external_id: current.to_string(),
                    remote_external_id: remote.id.clone(),
                });
                patch.external_id = Some(remote.id.clone());
            }
            None => patch.external_id = Some(remote.id.clone()),
        }

        if remote.is_confirmed() && !local.verified {
            patch.verified = Some(true);
        }

        Resolution { patch, discrepancy }
    }
}
