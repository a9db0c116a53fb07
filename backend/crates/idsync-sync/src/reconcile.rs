//! Full batch reconciliation between the local store and the provider.
//!
//! Remote work is a single sequential stream of calls. Every record is
//! applied on its own: a failure is recorded on the run and the next record
//! is processed, and a cancelled run stops between records.

use crate::credentials::generate_password;
use crate::{
    CancellationSignal, ConflictResolver, LocalWriter, Metrics, RemoteDirectory,
    Result as SyncResult, SyncError, UpsertOutcome, UserLocks, execute_with_retry,
};

use idsync_core::{LocalUser, RemoteUser, SkipReason, SyncDirection, SyncRun};
use idsync_provider::NewRemoteUser;

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use chrono::Utc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOptions {
    pub direction: SyncDirection,
    /// Create remote accounts for unmatched local users
    pub force: bool,
    /// Plan only; neither store is written
    pub dry_run: bool,
    pub email_filter: Option<String>,
}

enum RecordChange {
    Created,
    Updated,
    Unchanged,
}

/// Active local users indexed both ways, plus emails that only exist as
/// soft-deleted rows
struct LocalIndex {
    by_external_id: HashMap<String, LocalUser>,
    by_email: HashMap<String, LocalUser>,
    deleted_emails: HashSet<String>,
}

impl LocalIndex {
    fn build(users: Vec<LocalUser>) -> Self {
        let mut index = Self {
            by_external_id: HashMap::new(),
            by_email: HashMap::new(),
            deleted_emails: HashSet::new(),
        };

        let mut deleted = Vec::new();
        for user in users {
            if user.is_active() {
                index.insert(user);
            } else {
                deleted.push(user.email);
            }
        }

        index.deleted_emails = deleted
            .into_iter()
            .filter(|email| !index.by_email.contains_key(email))
            .collect();
        index
    }

    fn insert(&mut self, user: LocalUser) {
        if let Some(external_id) = &user.external_id {
            self.by_external_id.insert(external_id.clone(), user.clone());
        }
        self.by_email.insert(user.email.clone(), user);
    }

    fn find(&self, remote: &RemoteUser, email: &str) -> Option<&LocalUser> {
        self.by_external_id
            .get(&remote.id)
            .or_else(|| self.by_email.get(email))
    }
}

pub struct ReconciliationEngine {
    writer: LocalWriter,
    directory: RemoteDirectory,
    locks: UserLocks,
    metrics: Metrics,
}

impl ReconciliationEngine {
    pub fn new(
        writer: LocalWriter,
        directory: RemoteDirectory,
        locks: UserLocks,
        metrics: Metrics,
    ) -> Self {
        Self {
            writer,
            directory,
            locks,
            metrics,
        }
    }

    pub async fn run(
        &self,
        options: &SyncOptions,
        cancel: &mut CancellationSignal,
    ) -> SyncResult<SyncRun> {
        let started = Instant::now();
        let mut run = SyncRun::start(options.direction, options.dry_run);
        log::info!(
            "Starting {} sync (force={}, dry_run={}, email={})",
            options.direction,
            options.force,
            options.dry_run,
            options.email_filter.as_deref().unwrap_or("*")
        );

        let remote_users = match self
            .directory
            .list_all(options.email_filter.as_deref())
            .await
        {
            Ok(users) => users,
            Err(e) => {
                log::error!("Could not list remote users: {}", e);
                self.metrics.sync_failed();
                return Err(e);
            }
        };
        log::info!("Fetched {} remote users", remote_users.len());

        if options.direction.includes_local() {
            self.to_local(&mut run, &remote_users, options, cancel)
                .await?;
        }

        if options.direction.includes_remote() && !run.cancelled {
            self.to_remote(&mut run, &remote_users, options, cancel)
                .await?;
        }

        run.finish();
        self.metrics.sync_completed(&run, started.elapsed());
        log::info!("Sync finished: {}", run.summary());

        Ok(run)
    }

    async fn to_local(
        &self,
        run: &mut SyncRun,
        remote_users: &[RemoteUser],
        options: &SyncOptions,
        cancel: &mut CancellationSignal,
    ) -> SyncResult<()> {
        let locals = self
            .writer
            .users()
            .list_all(options.email_filter.as_deref())
            .await?;
        let mut index = LocalIndex::build(locals);

        for remote in remote_users {
            if cancel.is_cancelled() {
                run.cancelled = true;
                break;
            }

            let Some(email) = remote.normalized_email() else {
                run.record_skip(format!("ext:{}", remote.id), SkipReason::MissingEmail);
                continue;
            };

            match index.find(remote, &email) {
                Some(local) => {
                    let resolution = ConflictResolver::resolve(local, remote);
                    if resolution.patch.is_empty() {
                        run.unchanged += 1;
                        continue;
                    }
                    if options.dry_run {
                        run.planned.push(format!(
                            "update local {}: {}",
                            local.email,
                            resolution.patch.describe()
                        ));
                        run.discrepancies.extend(resolution.discrepancy);
                        continue;
                    }
                }
                None => {
                    if index.deleted_emails.contains(&email) {
                        log::info!("Skipping {}: deleted locally", email);
                        run.record_skip(&email, SkipReason::LocallyDeleted);
                        continue;
                    }
                    if options.dry_run {
                        run.planned
                            .push(format!("create local {} linked to {}", email, remote.id));
                        continue;
                    }
                }
            }

            let _guard = self.locks.lock(&email).await;
            let result = execute_with_retry(self.directory.retry(), "apply remote user", || {
                self.writer.upsert_from_remote(remote, Utc::now())
            })
            .await;

            match result {
                Ok(UpsertOutcome::Created(user)) => {
                    run.created += 1;
                    index.insert(user);
                }
                Ok(UpsertOutcome::Updated {
                    user, discrepancy, ..
                }) => {
                    run.updated += 1;
                    run.discrepancies.extend(discrepancy);
                    index.insert(user);
                }
                Ok(UpsertOutcome::Unchanged(_)) => run.unchanged += 1,
                Ok(UpsertOutcome::LocallyDeleted(email)) => {
                    run.record_skip(&email, SkipReason::LocallyDeleted)
                }
                Err(e) => {
                    log::error!("to-local failed for {}: {}", email, e);
                    run.record_error(&email, e.to_string());
                }
            }
        }

        Ok(())
    }

    async fn to_remote(
        &self,
        run: &mut SyncRun,
        remote_users: &[RemoteUser],
        options: &SyncOptions,
        cancel: &mut CancellationSignal,
    ) -> SyncResult<()> {
        // Reloaded so accounts created by a preceding to-local phase count
        let locals = self
            .writer
            .users()
            .list_active(options.email_filter.as_deref())
            .await?;

        let mut by_email: HashMap<String, &RemoteUser> = HashMap::new();
        let mut by_id: HashMap<&str, &RemoteUser> = HashMap::new();
        for remote in remote_users {
            if let Some(email) = remote.normalized_email() {
                by_email.entry(email).or_insert(remote);
            }
            by_id.insert(remote.id.as_str(), remote);
        }

        for local in &locals {
            if cancel.is_cancelled() {
                run.cancelled = true;
                break;
            }

            let matched = by_email.get(&local.email).copied().or_else(|| {
                local
                    .external_id
                    .as_deref()
                    .and_then(|id| by_id.get(id).copied())
            });

            if matched.is_none() && !options.force {
                log::info!("Skipping {}: no remote account, needs --force", local.email);
                run.record_skip(&local.email, SkipReason::NeedsForce);
                continue;
            }

            match self.push_local(run, local, matched, options.dry_run).await {
                Ok(RecordChange::Created) => run.created += 1,
                Ok(RecordChange::Updated) => run.updated += 1,
                Ok(RecordChange::Unchanged) => run.unchanged += 1,
                Err(e) => {
                    log::error!("to-remote failed for {}: {}", local.email, e);
                    run.record_error(&local.email, e.to_string());
                }
            }
        }

        Ok(())
    }

    async fn push_local(
        &self,
        run: &mut SyncRun,
        local: &LocalUser,
        remote: Option<&RemoteUser>,
        dry_run: bool,
    ) -> SyncResult<RecordChange> {
        let Some(remote) = remote else {
            if dry_run {
                run.planned.push(format!("create remote {}", local.email));
                return Ok(RecordChange::Unchanged);
            }
            let _guard = self.locks.lock(&local.email).await;
            return self.create_remote(local).await;
        };

        // Linking follows the same precedence as the to-local phase: a
        // stale cached id is overwritten and reported
        let resolution = ConflictResolver::resolve(local, remote);
        if let Some(discrepancy) = resolution.discrepancy
            && !run.discrepancies.contains(&discrepancy)
        {
            run.discrepancies.push(discrepancy);
        }

        let needs_confirm = local.verified && !remote.is_confirmed();
        let needs_link = resolution.patch.external_id.is_some();
        if !needs_confirm && !needs_link {
            return Ok(RecordChange::Unchanged);
        }

        if dry_run {
            if needs_confirm {
                run.planned
                    .push(format!("confirm remote {} ({})", local.email, remote.id));
            }
            if needs_link {
                run.planned
                    .push(format!("link local {} to {}", local.email, remote.id));
            }
            return Ok(RecordChange::Unchanged);
        }

        let _guard = self.locks.lock(&local.email).await;

        if needs_confirm {
            self.directory
                .call("confirm remote email", || {
                    self.directory.provider().confirm_email(&remote.id)
                })
                .await?;
            log::info!("Confirmed remote email for {}", local.email);
        }

        if needs_link {
            self.writer
                .users()
                .link_external_id(local.id, &remote.id, remote.is_confirmed(), Utc::now())
                .await?;
        }

        Ok(RecordChange::Updated)
    }

    async fn create_remote(&self, local: &LocalUser) -> SyncResult<RecordChange> {
        let new_user = NewRemoteUser::new(
            &local.email,
            generate_password(),
            local.verified,
            &local.username,
        );

        let created = self
            .directory
            .call("create remote user", || {
                self.directory.provider().create_user(&new_user)
            })
            .await;

        let remote = match created {
            Ok(remote) => remote,
            Err(e) if e.is_already_exists() => {
                // Created between our listing and now; link instead
                self.directory
                    .find_by_email(&local.email)
                    .await?
                    .ok_or_else(|| SyncError::from(e))?
            }
            Err(e) => return Err(SyncError::from(e)),
        };

        self.writer
            .users()
            .link_external_id(local.id, &remote.id, false, Utc::now())
            .await?;
        log::info!("Created remote user {} as {}", local.email, remote.id);

        Ok(RecordChange::Created)
    }
}
