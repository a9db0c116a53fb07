//! Ordered, idempotent user deletion across both stores.
//!
//! Remote removal tries each [`DeletionStrategy`] in turn. Only a
//! permission-denied outcome moves on to the next strategy; "not found" is
//! success. Local removal is soft or hard according to the store's mode.

use crate::{LocalWriter, Metrics, RemoteDirectory, Result as SyncResult, SyncError, UserLocks};

use idsync_core::{RemoteUser, normalize_email};

use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionStrategy {
    HardDelete,
    /// Ban the account and strip its confirmation
    Disable,
}

pub const DELETION_STRATEGIES: [DeletionStrategy; 2] =
    [DeletionStrategy::HardDelete, DeletionStrategy::Disable];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RemoteDeletion {
    Deleted { external_id: String },
    Disabled { external_id: String },
    AlreadyGone,
}

impl RemoteDeletion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deleted { .. } => "deleted",
            Self::Disabled { .. } => "disabled",
            Self::AlreadyGone => "already_gone",
        }
    }
}

/// Result of `delete_local_user`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub email: String,
    /// None when remote deletion failed in force mode
    pub remote: Option<RemoteDeletion>,
    pub remote_error: Option<String>,
    pub local_removed: bool,
}

#[derive(Clone)]
pub struct DeletionCoordinator {
    directory: RemoteDirectory,
    writer: LocalWriter,
    locks: UserLocks,
    metrics: Metrics,
}

impl DeletionCoordinator {
    pub fn new(
        directory: RemoteDirectory,
        writer: LocalWriter,
        locks: UserLocks,
        metrics: Metrics,
    ) -> Self {
        Self {
            directory,
            writer,
            locks,
            metrics,
        }
    }

    /// Locate the remote account (cached id first, then the listing) and
    /// remove it
    pub async fn delete_remote_user(&self, email: &str) -> SyncResult<RemoteDeletion> {
        let email = normalize_email(email);

        let Some(remote) = self.locate(&email).await? else {
            log::info!("Remote user {} not found, nothing to delete", email);
            self.metrics.remote_deletion("already_gone");
            return Ok(RemoteDeletion::AlreadyGone);
        };

        self.remove_remote(&remote).await
    }

    async fn locate(&self, email: &str) -> SyncResult<Option<RemoteUser>> {
        let cached = self
            .writer
            .users()
            .find_active_by_email(email)
            .await?
            .and_then(|user| user.external_id);

        if let Some(external_id) = cached {
            if let Some(remote) = self.directory.get(&external_id).await? {
                return Ok(Some(remote));
            }
            log::debug!(
                "Cached external id {} for {} is unknown remotely, searching by email",
                external_id,
                email
            );
        }

        self.directory.find_by_email(email).await
    }

    /// Apply the strategy list to a known remote account
    pub async fn remove_remote(&self, remote: &RemoteUser) -> SyncResult<RemoteDeletion> {
        let mut last_error: Option<SyncError> = None;

        for strategy in DELETION_STRATEGIES {
            let result = match strategy {
                DeletionStrategy::HardDelete => {
                    self.directory
                        .call("delete remote user", || {
                            self.directory.provider().delete_user(&remote.id)
                        })
                        .await
                }
                DeletionStrategy::Disable => {
                    self.directory
                        .call("disable remote user", || {
                            self.directory.provider().disable_user(&remote.id)
                        })
                        .await
                }
            };

            match result {
                Ok(()) => {
                    let outcome = match strategy {
                        DeletionStrategy::HardDelete => RemoteDeletion::Deleted {
                            external_id: remote.id.clone(),
                        },
                        DeletionStrategy::Disable => RemoteDeletion::Disabled {
                            external_id: remote.id.clone(),
                        },
                    };
                    log::info!("Remote user {} {}", remote.id, outcome.as_str());
                    self.metrics.remote_deletion(outcome.as_str());
                    return Ok(outcome);
                }
                Err(e) if e.is_not_found() => {
                    self.metrics.remote_deletion("already_gone");
                    return Ok(RemoteDeletion::AlreadyGone);
                }
                Err(e) if e.is_permission_denied() => {
                    log::warn!(
                        "{:?} not permitted for remote user {}: {}",
                        strategy,
                        remote.id,
                        e
                    );
                    last_error = Some(SyncError::from(e));
                }
                Err(e) => {
                    self.metrics.provider_error(e.kind());
                    return Err(SyncError::from(e));
                }
            }
        }

        self.metrics.remote_deletion("failed");
        Err(last_error.unwrap_or_else(|| {
            SyncError::not_found(format!("no deletion strategy applied to {}", remote.id))
        }))
    }

    /// Delete the account from both stores. Without `force` the local row
    /// is kept when remote deletion fails; with `force` the failure is
    /// logged and the local row is removed anyway.
    pub async fn delete_local_user(&self, email: &str, force: bool) -> SyncResult<DeletionReport> {
        let email = normalize_email(email);
        let _guard = self.locks.lock(&email).await;

        let (remote, remote_error) = match self.delete_remote_user(&email).await {
            Ok(outcome) => (Some(outcome), None),
            Err(e) if force => {
                log::warn!(
                    "Remote deletion of {} failed, removing local user anyway: {}",
                    email,
                    e
                );
                (None, Some(e.to_string()))
            }
            Err(e) => return Err(SyncError::remote_deletion_failed(&email, &e)),
        };

        let local_removed = self
            .writer
            .remove_matching(None, Some(&email), Utc::now())
            .await?
            > 0;

        if local_removed {
            log::info!(
                "Deleted local user {} ({} delete)",
                email,
                if self.writer.soft_delete() {
                    "soft"
                } else {
                    "hard"
                }
            );
        } else {
            log::info!("No active local user {}", email);
        }

        Ok(DeletionReport {
            email,
            remote,
            remote_error,
            local_removed,
        })
    }
}
