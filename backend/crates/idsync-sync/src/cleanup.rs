//! Bulk reset of both stores and the verify-clean diagnostic.

use crate::{
    DeletionCoordinator, RemoteDeletion, RemoteDirectory, Result as SyncResult, SyncError,
};

use idsync_core::{RecordFailure, RemoteUser};
use idsync_db::LocalUserRepository;

use std::collections::HashSet;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

/// Provider-side roles that count as administrators
const REMOTE_ADMIN_ROLES: [&str; 2] = ["admin", "supabase_admin"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupStore {
    Local,
    Remote,
    #[default]
    Both,
}

impl CleanupStore {
    pub fn includes_local(&self) -> bool {
        matches!(self, Self::Local | Self::Both)
    }

    pub fn includes_remote(&self) -> bool {
        matches!(self, Self::Remote | Self::Both)
    }
}

impl FromStr for CleanupStore {
    type Err = SyncError;

    fn from_str(s: &str) -> SyncResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            "both" => Ok(Self::Both),
            other => Err(SyncError::validation(format!(
                "store must be local, remote or both, got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub local_removed: u64,
    pub remote_deleted: usize,
    pub remote_disabled: usize,
    pub remote_preserved: Vec<String>,
    pub remote_failed: Vec<RecordFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    /// Rows in the table, soft-deleted ones included
    pub local_total: usize,
    pub local_active: usize,
    pub remote_total: usize,
    pub remaining_local: Vec<String>,
    pub remaining_remote: Vec<String>,
}

impl CleanReport {
    pub fn is_clean(&self) -> bool {
        self.local_total == 0 && self.remote_total == 0
    }
}

pub struct CleanupService {
    users: LocalUserRepository,
    directory: RemoteDirectory,
    deletion: DeletionCoordinator,
}

fn is_remote_admin(user: &RemoteUser) -> bool {
    user.app_metadata
        .get("role")
        .and_then(Value::as_str)
        .is_some_and(|role| REMOTE_ADMIN_ROLES.contains(&role))
}

impl CleanupService {
    pub fn new(
        users: LocalUserRepository,
        directory: RemoteDirectory,
        deletion: DeletionCoordinator,
    ) -> Self {
        Self {
            users,
            directory,
            deletion,
        }
    }

    /// How many local rows a purge would remove
    pub async fn local_purge_count(&self, preserve_admin: bool) -> SyncResult<usize> {
        let users = self.users.list_all(None).await?;
        Ok(users
            .iter()
            .filter(|user| !(preserve_admin && user.is_admin))
            .count())
    }

    /// Remove every user from the selected stores. Remote failures are
    /// collected per user; the purge continues.
    pub async fn purge(&self, store: CleanupStore, preserve_admin: bool) -> SyncResult<CleanupReport> {
        let mut report = CleanupReport::default();

        // Admin emails must be read before the local purge removes them
        let admin_emails: HashSet<String> = if preserve_admin {
            self.users
                .list_active(None)
                .await?
                .into_iter()
                .filter(|user| user.is_admin)
                .map(|user| user.email)
                .collect()
        } else {
            HashSet::new()
        };

        if store.includes_remote() {
            let remote_users = self.directory.list_all(None).await?;
            log::info!("Deleting {} remote users", remote_users.len());

            for remote in &remote_users {
                let email = remote
                    .normalized_email()
                    .unwrap_or_else(|| format!("ext:{}", remote.id));

                if preserve_admin && (is_remote_admin(remote) || admin_emails.contains(&email)) {
                    log::info!("Preserving admin user {}", email);
                    report.remote_preserved.push(email);
                    continue;
                }

                match self.deletion.remove_remote(remote).await {
                    Ok(RemoteDeletion::Deleted { .. }) | Ok(RemoteDeletion::AlreadyGone) => {
                        report.remote_deleted += 1
                    }
                    Ok(RemoteDeletion::Disabled { .. }) => report.remote_disabled += 1,
                    Err(e) => {
                        log::warn!("Failed to delete remote user {}: {}", email, e);
                        report.remote_failed.push(RecordFailure {
                            subject: email,
                            message: e.to_string(),
                        });
                    }
                }
            }
        }

        if store.includes_local() {
            report.local_removed = self.users.purge(preserve_admin).await?;
            log::info!("Deleted {} local users", report.local_removed);
        }

        Ok(report)
    }

    pub async fn verify_clean(&self) -> SyncResult<CleanReport> {
        let locals = self.users.list_all(None).await?;
        let local_active = locals.iter().filter(|user| user.is_active()).count();
        let remotes = self.directory.list_all(None).await?;

        Ok(CleanReport {
            local_total: locals.len(),
            local_active,
            remote_total: remotes.len(),
            remaining_local: locals.into_iter().map(|user| user.email).collect(),
            remaining_remote: remotes
                .iter()
                .map(|user| {
                    user.normalized_email()
                        .unwrap_or_else(|| format!("ext:{}", user.id))
                })
                .collect(),
        })
    }
}
