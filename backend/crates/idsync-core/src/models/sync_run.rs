//! Outcome of one reconciliation run.
//!
//! Record-level failures never abort a run; they are collected here and the
//! run keeps going. `summary()` is the text persisted on a schedule.

use crate::SyncDirection;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Local account has no remote counterpart and the run was not forced
    NeedsForce,
    /// Remote account matches a soft-deleted local account
    LocallyDeleted,
    /// Remote account has no usable email
    MissingEmail,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeedsForce => "needs --force",
            Self::LocallyDeleted => "locally deleted",
            Self::MissingEmail => "missing email",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub subject: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFailure {
    pub subject: String,
    pub message: String,
}

/// Both stores linked the same email to different external ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub email: String,
    pub local_external_id: String,
    pub remote_external_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRun {
    pub direction: SyncDirection,
    pub dry_run: bool,
    pub created: u32,
    pub updated: u32,
    pub unchanged: u32,
    pub errors: Vec<RecordFailure>,
    pub skipped: Vec<SkippedRecord>,
    pub discrepancies: Vec<Discrepancy>,
    /// Actions a dry run would have taken
    pub planned: Vec<String>,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl SyncRun {
    pub fn start(direction: SyncDirection, dry_run: bool) -> Self {
        Self {
            direction,
            dry_run,
            created: 0,
            updated: 0,
            unchanged: 0,
            errors: Vec::new(),
            skipped: Vec::new(),
            discrepancies: Vec::new(),
            planned: Vec::new(),
            cancelled: false,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn record_error(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        self.errors.push(RecordFailure {
            subject: subject.into(),
            message: message.into(),
        });
    }

    pub fn record_skip(&mut self, subject: impl Into<String>, reason: SkipReason) {
        self.skipped.push(SkippedRecord {
            subject: subject.into(),
            reason,
        });
    }

    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|s| s.reason == reason).count()
    }

    pub fn summary(&self) -> String {
        let mut text = format!(
            "{}: created={} updated={} unchanged={} skipped={} errors={}",
            self.direction,
            self.created,
            self.updated,
            self.unchanged,
            self.skipped.len(),
            self.errors.len()
        );

        let needs_force = self.skipped_for(SkipReason::NeedsForce);
        if needs_force > 0 {
            text.push_str(&format!(" ({} need --force)", needs_force));
        }
        if !self.discrepancies.is_empty() {
            text.push_str(&format!(" discrepancies={}", self.discrepancies.len()));
        }
        if self.dry_run {
            text.push_str(&format!(" [dry run, {} planned]", self.planned.len()));
        }
        if self.cancelled {
            text.push_str(" [cancelled]");
        }

        text
    }
}
