use crate::{SyncDirection, SyncFrequency};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted schedule that triggers reconciliation on a cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSchedule {
    pub id: Uuid,
    pub direction: SyncDirection,
    pub frequency: SyncFrequency,
    pub is_active: bool,
    /// Passed to the engine as `force` (create missing remote accounts)
    pub force_update: bool,
    pub next_run_at: DateTime<Utc>,
    pub last_run_at: Option<DateTime<Utc>>,
    /// Run summary or `ERROR: ...` text of the last run
    pub last_status: Option<String>,
    /// Advisory lock held while a run is in progress
    pub locked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SyncSchedule {
    pub fn new(
        direction: SyncDirection,
        frequency: SyncFrequency,
        force_update: bool,
        next_run_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            direction,
            frequency,
            is_active: true,
            force_update,
            next_run_at,
            last_run_at: None,
            last_status: None,
            locked_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.next_run_at <= now
    }
}
