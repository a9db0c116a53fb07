use idsync_core::{SyncDirection, SyncFrequency, SyncSchedule};

use serde::Serialize;

/// Schedule DTO for JSON serialization
#[derive(Debug, Serialize)]
pub struct ScheduleDto {
    pub id: String,
    pub direction: SyncDirection,
    pub frequency: SyncFrequency,
    pub is_active: bool,
    pub force_update: bool,
    pub next_run_at: i64,
    pub last_run_at: Option<i64>,
    pub last_status: Option<String>,
    /// A run currently holds the advisory lock
    pub running: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<SyncSchedule> for ScheduleDto {
    fn from(s: SyncSchedule) -> Self {
        Self {
            id: s.id.to_string(),
            direction: s.direction,
            frequency: s.frequency,
            is_active: s.is_active,
            force_update: s.force_update,
            next_run_at: s.next_run_at.timestamp(),
            last_run_at: s.last_run_at.map(|dt| dt.timestamp()),
            last_status: s.last_status,
            running: s.locked_at.is_some(),
            created_at: s.created_at.timestamp(),
            updated_at: s.updated_at.timestamp(),
        }
    }
}
