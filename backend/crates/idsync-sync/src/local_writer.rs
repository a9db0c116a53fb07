//! Applies remote state to the local store.
//!
//! Shared by the webhook handlers and the to-local phase of a run, so both
//! paths make identical decisions for the same remote record. Callers hold
//! the user's lock and wrap each call in the retry executor.

use crate::credentials::{placeholder_credential, unique_username};
use crate::{ConflictResolver, LocalUserPatch, Result as SyncResult, SyncError};

use idsync_core::{Discrepancy, LocalUser, RemoteUser, normalize_email};
use idsync_db::LocalUserRepository;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    Created(LocalUser),
    Updated {
        user: LocalUser,
        patch: LocalUserPatch,
        discrepancy: Option<Discrepancy>,
        /// Duplicate rows removed while merging
        merged: usize,
    },
    Unchanged(LocalUser),
    /// The email only exists as soft-deleted rows; nothing was written
    LocallyDeleted(String),
}

#[derive(Clone)]
pub struct LocalWriter {
    users: LocalUserRepository,
    soft_delete: bool,
}

impl LocalWriter {
    pub fn new(users: LocalUserRepository, soft_delete: bool) -> Self {
        Self { users, soft_delete }
    }

    pub fn users(&self) -> &LocalUserRepository {
        &self.users
    }

    pub fn soft_delete(&self) -> bool {
        self.soft_delete
    }

    /// Active local rows matching the remote id or email, oldest first
    pub async fn find_matches(
        &self,
        external_id: Option<&str>,
        email: Option<&str>,
    ) -> SyncResult<Vec<LocalUser>> {
        let mut matches: Vec<LocalUser> = Vec::new();

        if let Some(external_id) = external_id
            && let Some(user) = self.users.find_active_by_external_id(external_id).await?
        {
            matches.push(user);
        }

        if let Some(email) = email
            && let Some(user) = self.users.find_active_by_email(email).await?
            && !matches.iter().any(|m| m.id == user.id)
        {
            matches.push(user);
        }

        matches.sort_by_key(|user| (user.created_at, user.id));
        Ok(matches)
    }

    /// Create, link or update the local record for `remote`
    pub async fn upsert_from_remote(
        &self,
        remote: &RemoteUser,
        now: DateTime<Utc>,
    ) -> SyncResult<UpsertOutcome> {
        let email = remote.normalized_email();
        let mut matches = self.find_matches(Some(&remote.id), email.as_deref()).await?;

        if matches.is_empty() {
            let Some(email) = email else {
                return Err(SyncError::malformed(format!(
                    "no local user for {} and no email to create one from",
                    remote.id
                )));
            };
            if self.users.is_deleted_email(&email).await? {
                log::info!("Not recreating {}: deleted locally", email);
                return Ok(UpsertOutcome::LocallyDeleted(email));
            }
            return self.create_from_remote(remote, &email, now).await;
        }

        let mut primary = matches.remove(0);

        // Duplicates go first: they may hold the external id the primary
        // row is about to take
        for duplicate in &matches {
            log::info!(
                "Removing duplicate local user {} ({}) merged into {}",
                duplicate.email,
                duplicate.id,
                primary.id
            );
            self.remove(duplicate, now).await?;
        }
        let merged = matches.len();

        let resolution = ConflictResolver::resolve(&primary, remote);
        if resolution.patch.is_empty() && merged == 0 {
            return Ok(UpsertOutcome::Unchanged(primary));
        }

        resolution.patch.apply(&mut primary, now);
        self.users.update(&primary).await?;

        Ok(UpsertOutcome::Updated {
            user: primary,
            patch: resolution.patch,
            discrepancy: resolution.discrepancy,
            merged,
        })
    }

    async fn create_from_remote(
        &self,
        remote: &RemoteUser,
        email: &str,
        now: DateTime<Utc>,
    ) -> SyncResult<UpsertOutcome> {
        let hint = remote
            .username_hint()
            .map(String::from)
            .unwrap_or_else(|| email.split('@').next().unwrap_or(email).to_string());
        let username = unique_username(&self.users, &hint).await?;

        let mut user = LocalUser::new(email, username);
        user.external_id = Some(remote.id.clone());
        user.verified = remote.is_confirmed();
        user.credential = Some(placeholder_credential());
        user.last_synced_at = Some(now);
        user.created_at = now;
        user.updated_at = now;

        self.users.create(&user).await?;
        log::info!(
            "Created local user {} ({}) linked to {}",
            user.email,
            user.username,
            remote.id
        );

        Ok(UpsertOutcome::Created(user))
    }

    /// Soft- or hard-delete one row according to the store's mode
    pub async fn remove(&self, user: &LocalUser, now: DateTime<Utc>) -> SyncResult<bool> {
        let removed = if self.soft_delete {
            self.users.soft_delete(user.id, now).await?
        } else {
            self.users.hard_delete(user.id).await?
        };
        Ok(removed)
    }

    /// Remove every active row matching the id or email. Returns the count.
    pub async fn remove_matching(
        &self,
        external_id: Option<&str>,
        email: Option<&str>,
        now: DateTime<Utc>,
    ) -> SyncResult<usize> {
        let email = email.map(normalize_email);
        let matches = self.find_matches(external_id, email.as_deref()).await?;

        let mut removed = 0;
        for user in &matches {
            if self.remove(user, now).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
