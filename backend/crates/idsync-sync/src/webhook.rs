//! Real-time single-user events pushed by the identity provider.
//!
//! Signature and payload problems are rejected immediately and never
//! retried. Handlers run under the user's lock and inside the retry
//! executor; once retries are exhausted the caller gets a retryable-class
//! error so the provider redelivers.

use crate::signature::verify_signature;
use crate::{
    LocalWriter, Metrics, Result as SyncResult, RetryPolicy, SyncError, UpsertOutcome,
    UserLocks, execute_with_retry,
};

use idsync_config::WebhookConfig;
use idsync_core::{RemoteUser, UserRef, WebhookAction, WebhookEvent};

use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tracing::Instrument;

/// Request id logged when the provider sends none
pub const UNKNOWN_REQUEST_ID: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookStatus {
    Success,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookOutcome {
    pub status: WebhookStatus,
    pub message: String,
}

impl WebhookOutcome {
    fn success(message: impl Into<String>) -> Self {
        Self {
            status: WebhookStatus::Success,
            message: message.into(),
        }
    }

    fn skipped(message: impl Into<String>) -> Self {
        Self {
            status: WebhookStatus::Skipped,
            message: message.into(),
        }
    }
}

/// Raw inbound delivery, as received by the transport
#[derive(Debug, Clone, Copy)]
pub struct WebhookDelivery<'a> {
    pub body: &'a [u8],
    pub signature: Option<&'a str>,
    pub request_id: Option<&'a str>,
}

pub struct WebhookReceiver {
    config: WebhookConfig,
    writer: LocalWriter,
    locks: UserLocks,
    retry: RetryPolicy,
    metrics: Metrics,
}

impl WebhookReceiver {
    pub fn new(
        config: WebhookConfig,
        writer: LocalWriter,
        locks: UserLocks,
        retry: RetryPolicy,
        metrics: Metrics,
    ) -> Self {
        if config.verification_secret().is_none() {
            log::warn!("Webhook secret not configured, signature verification disabled");
        }

        Self {
            config,
            writer,
            locks,
            retry,
            metrics,
        }
    }

    pub async fn receive(&self, delivery: WebhookDelivery<'_>) -> SyncResult<WebhookOutcome> {
        let request_id = delivery.request_id.unwrap_or(UNKNOWN_REQUEST_ID);

        if !self.config.sync_enabled {
            log::info!("Webhook {} skipped: sync disabled", request_id);
            return Ok(WebhookOutcome::skipped("Sync is disabled"));
        }

        if let Some(secret) = self.config.verification_secret() {
            if let Err(e) = verify_signature(secret, delivery.body, delivery.signature) {
                log::warn!("Webhook {} rejected: {}", request_id, e);
                self.metrics.webhook_rejected("signature");
                return Err(e);
            }
        } else {
            log::debug!("Webhook signature verification skipped (development mode)");
        }

        let event = match WebhookEvent::from_slice(delivery.body, Utc::now()) {
            Ok(event) => event,
            Err(e) => {
                log::warn!("Webhook {} rejected: {}", request_id, e);
                self.metrics.webhook_rejected("malformed");
                return Err(SyncError::from(e));
            }
        };

        let event_type = event.action.kind().to_string();
        log::info!("Received webhook {} (request id {})", event_type, request_id);
        self.metrics.webhook_received(&event_type);

        let span = tracing::info_span!(
            "webhook",
            request_id = %request_id,
            event_type = %event_type,
        );

        let started = Instant::now();
        let result = self.dispatch(&event).instrument(span).await;
        self.metrics.webhook_latency(started.elapsed());

        if let Err(e) = &result {
            log::error!("Webhook {} ({}) failed: {}", request_id, event_type, e);
            self.metrics.webhook_failed();
        }

        result
    }

    /// Apply an already decoded event
    pub async fn dispatch(&self, event: &WebhookEvent) -> SyncResult<WebhookOutcome> {
        let Some(key) = event.subject_key() else {
            log::info!("Unhandled webhook event type: {}", event.action.kind());
            return Ok(WebhookOutcome::success(format!(
                "Event {} ignored",
                event.action.kind()
            )));
        };

        let _guard = self.locks.lock(&key).await;
        let operation = format!("webhook {}", event.action.kind());

        let result = execute_with_retry(&self.retry, &operation, || self.apply(&event.action)).await;

        result.map_err(|e| {
            if e.is_retryable() {
                SyncError::retry_exhausted(&operation, self.retry.max_attempts(), &e)
            } else {
                e
            }
        })
    }

    async fn apply(&self, action: &WebhookAction) -> SyncResult<WebhookOutcome> {
        match action {
            WebhookAction::Created(user) => self.handle_created(user).await,
            WebhookAction::Updated(user) => self.handle_updated(user).await,
            WebhookAction::Deleted(user_ref) => self.handle_deleted(user_ref).await,
            WebhookAction::Unknown(kind) => {
                Ok(WebhookOutcome::success(format!("Event {} ignored", kind)))
            }
        }
    }

    async fn handle_created(&self, user: &RemoteUser) -> SyncResult<WebhookOutcome> {
        let outcome = self.writer.upsert_from_remote(user, Utc::now()).await?;

        Ok(match outcome {
            UpsertOutcome::Created(created) => {
                log::info!("Created local user {} from webhook", created.email);
                WebhookOutcome::success("Created new local user")
            }
            UpsertOutcome::Updated { user, .. } => {
                log::info!("User {} already existed locally, linked", user.email);
                WebhookOutcome::success("Updated existing local user")
            }
            UpsertOutcome::Unchanged(_) => WebhookOutcome::success("Local user already up to date"),
            UpsertOutcome::LocallyDeleted(email) => {
                WebhookOutcome::success(format!("Ignored {}: deleted locally", email))
            }
        })
    }

    async fn handle_updated(&self, user: &RemoteUser) -> SyncResult<WebhookOutcome> {
        let email = user.normalized_email();
        let matches = self
            .writer
            .find_matches(Some(&user.id), email.as_deref())
            .await?;

        if matches.is_empty() {
            log::warn!(
                "No local user for {} during update, creating",
                email.as_deref().unwrap_or(&user.id)
            );
            if email.is_none() {
                return Err(SyncError::malformed(
                    "updated event for an unknown user carries no email",
                ));
            }
            return self.handle_created(user).await;
        }

        let outcome = self.writer.upsert_from_remote(user, Utc::now()).await?;

        Ok(match outcome {
            UpsertOutcome::Updated { merged, .. } if merged > 0 => WebhookOutcome::success(
                format!("Updated primary user and removed {} duplicates", merged),
            ),
            UpsertOutcome::Updated { .. } => {
                WebhookOutcome::success("Local user updated from webhook")
            }
            UpsertOutcome::Unchanged(_) => WebhookOutcome::success("Local user already up to date"),
            UpsertOutcome::Created(_) => WebhookOutcome::success("Created new local user"),
            UpsertOutcome::LocallyDeleted(email) => {
                WebhookOutcome::success(format!("Ignored {}: deleted locally", email))
            }
        })
    }

    async fn handle_deleted(&self, user_ref: &UserRef) -> SyncResult<WebhookOutcome> {
        let removed = self
            .writer
            .remove_matching(
                user_ref.external_id.as_deref(),
                user_ref.email.as_deref(),
                Utc::now(),
            )
            .await?;

        let subject = user_ref
            .email
            .as_deref()
            .or(user_ref.external_id.as_deref())
            .unwrap_or("unknown");

        if removed == 0 {
            log::warn!("No local user found for deleted remote user {}", subject);
            return Ok(WebhookOutcome::success("No matching local user found"));
        }

        log::info!("Deleted {} local user(s) for remote user {}", removed, subject);
        Ok(WebhookOutcome::success(format!(
            "Deleted {} local user(s)",
            removed
        )))
    }
}
