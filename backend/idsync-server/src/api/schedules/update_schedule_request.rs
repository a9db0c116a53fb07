use idsync_core::{SyncDirection, SyncFrequency};
use idsync_sync::SchedulePatch;

use serde::Deserialize;

/// Partial update; omitted fields keep their value
#[derive(Debug, Default, Deserialize)]
pub struct UpdateScheduleRequest {
    pub direction: Option<SyncDirection>,
    pub frequency: Option<SyncFrequency>,
    pub is_active: Option<bool>,
    pub force_update: Option<bool>,
}

impl From<UpdateScheduleRequest> for SchedulePatch {
    fn from(req: UpdateScheduleRequest) -> Self {
        Self {
            direction: req.direction,
            frequency: req.frequency,
            is_active: req.is_active,
            force_update: req.force_update,
        }
    }
}
