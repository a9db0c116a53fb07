//! Deferred remote registration.
//!
//! Picks up local accounts that never got a remote counterpart (typically
//! because signup hit the provider's rate limit) once they are older than
//! the grace period, and registers them with bounded, fixed-delay retries.

use crate::credentials::generate_password;
use crate::{
    CancellationSignal, Metrics, RemoteDirectory, Result as SyncResult, SyncError, UserLocks,
};

use idsync_config::RegistrarConfig;
use idsync_core::{LocalUser, RecordFailure};
use idsync_db::LocalUserRepository;
use idsync_provider::NewRemoteUser;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::sleep;

#[derive(Debug, Clone)]
pub struct RegistrarOptions {
    pub grace_period: Duration,
    pub max_attempts: u32,
    pub rate_limit_delay: Duration,
    /// Older accounts are created pre-confirmed
    pub auto_confirm_after: Duration,
    pub dry_run: bool,
}

impl From<&RegistrarConfig> for RegistrarOptions {
    fn from(config: &RegistrarConfig) -> Self {
        Self {
            grace_period: Duration::from_secs(config.grace_period_secs),
            max_attempts: config.max_attempts.max(1),
            rate_limit_delay: Duration::from_secs(config.rate_limit_delay_secs),
            auto_confirm_after: Duration::from_secs(config.auto_confirm_after_secs),
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationReport {
    pub candidates: Vec<String>,
    /// Newly created remote accounts
    pub registered: Vec<String>,
    /// Already present remotely; linked instead of created
    pub linked: Vec<String>,
    pub failed: Vec<RecordFailure>,
    pub dry_run: bool,
    pub cancelled: bool,
}

impl RegistrationReport {
    pub fn summary(&self) -> String {
        let mut text = format!(
            "candidates={} registered={} linked={} failed={}",
            self.candidates.len(),
            self.registered.len(),
            self.linked.len(),
            self.failed.len()
        );
        if self.dry_run {
            text.push_str(" [dry run]");
        }
        if self.cancelled {
            text.push_str(" [cancelled]");
        }
        text
    }
}

enum Registered {
    Created,
    Linked,
}

#[derive(Clone)]
pub struct RateLimitAwareRegistrar {
    users: LocalUserRepository,
    directory: RemoteDirectory,
    locks: UserLocks,
    metrics: Metrics,
    options: RegistrarOptions,
}

/// Still unlinked, unverified and live after taking the user's lock
pub(crate) fn still_pending(user: &LocalUser) -> bool {
    user.external_id.is_none() && !user.verified && user.is_active()
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX)
}

impl RateLimitAwareRegistrar {
    pub fn new(
        users: LocalUserRepository,
        directory: RemoteDirectory,
        locks: UserLocks,
        metrics: Metrics,
        options: RegistrarOptions,
    ) -> Self {
        Self {
            users,
            directory,
            locks,
            metrics,
            options,
        }
    }

    pub fn options(&self) -> &RegistrarOptions {
        &self.options
    }

    /// Copy with different options (CLI overrides)
    pub fn with_options(&self, options: RegistrarOptions) -> Self {
        Self {
            options,
            ..self.clone()
        }
    }

    /// Unlinked, unverified, active accounts older than the grace period
    pub async fn candidates(&self, now: DateTime<Utc>) -> SyncResult<Vec<LocalUser>> {
        let cutoff = now - to_chrono(self.options.grace_period);
        Ok(self.users.find_pending_registration(cutoff).await?)
    }

    pub async fn sweep(
        &self,
        now: DateTime<Utc>,
        cancel: &mut CancellationSignal,
    ) -> SyncResult<RegistrationReport> {
        let candidates = self.candidates(now).await?;
        let mut report = RegistrationReport {
            candidates: candidates.iter().map(|u| u.email.clone()).collect(),
            dry_run: self.options.dry_run,
            ..RegistrationReport::default()
        };

        if candidates.is_empty() {
            log::debug!("No pending registrations");
            return Ok(report);
        }

        log::info!("Processing {} pending registrations", candidates.len());

        if self.options.dry_run {
            for user in &candidates {
                log::info!(
                    "[dry run] would register {} (created {})",
                    user.email,
                    user.created_at
                );
            }
            return Ok(report);
        }

        for user in &candidates {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let _guard = self.locks.lock(&user.email).await;

            // The webhook path or a run may have linked it meanwhile
            match self.users.find_by_id(user.id).await? {
                Some(fresh) if still_pending(&fresh) => {}
                _ => continue,
            }

            match self.register(user, now).await {
                Ok(Registered::Created) => report.registered.push(user.email.clone()),
                Ok(Registered::Linked) => report.linked.push(user.email.clone()),
                Err(e) => {
                    log::error!("Registration of {} failed: {}", user.email, e);
                    report.failed.push(RecordFailure {
                        subject: user.email.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        self.metrics.registrar_sweep(
            report.candidates.len(),
            report.registered.len(),
            report.linked.len(),
            report.failed.len(),
        );
        log::info!("Registration sweep finished: {}", report.summary());

        Ok(report)
    }

    async fn register(&self, user: &LocalUser, now: DateTime<Utc>) -> SyncResult<Registered> {
        let auto_confirm = now - user.created_at > to_chrono(self.options.auto_confirm_after);
        let new_user = NewRemoteUser::new(
            &user.email,
            generate_password(),
            auto_confirm,
            &user.username,
        );

        let mut attempt = 0;
        loop {
            attempt += 1;

            match self.directory.provider().create_user(&new_user).await {
                Ok(remote) => {
                    let verified = auto_confirm || remote.is_confirmed();
                    self.users
                        .link_external_id(user.id, &remote.id, verified, Utc::now())
                        .await?;
                    log::info!(
                        "Registered {} remotely as {}{}",
                        user.email,
                        remote.id,
                        if auto_confirm { " (pre-confirmed)" } else { "" }
                    );
                    return Ok(Registered::Created);
                }
                Err(e) if e.is_already_exists() => return self.link_existing(user).await,
                Err(e) if e.is_rate_limited() || e.is_retryable() => {
                    if e.is_rate_limited() {
                        self.metrics.registrar_rate_limited();
                    }
                    if attempt >= self.options.max_attempts {
                        return Err(SyncError::from(e));
                    }
                    log::warn!(
                        "Registration of {} attempt {}/{} failed: {}. Waiting {:?}",
                        user.email,
                        attempt,
                        self.options.max_attempts,
                        e,
                        self.options.rate_limit_delay
                    );
                    sleep(self.options.rate_limit_delay).await;
                }
                Err(e) => {
                    self.metrics.provider_error(e.kind());
                    return Err(SyncError::from(e));
                }
            }
        }
    }

    /// Self-heal: the account exists remotely, so link it
    async fn link_existing(&self, user: &LocalUser) -> SyncResult<Registered> {
        let remote = self
            .directory
            .find_by_email(&user.email)
            .await?
            .ok_or_else(|| {
                SyncError::not_found(format!(
                    "{} reported as existing but absent from the listing",
                    user.email
                ))
            })?;

        self.users
            .link_external_id(user.id, &remote.id, remote.is_confirmed(), Utc::now())
            .await?;
        log::info!(
            "{} already registered remotely, linked to {}",
            user.email,
            remote.id
        );

        Ok(Registered::Linked)
    }
}
