use idsync_core::{SyncDirection, SyncFrequency};

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateScheduleRequest {
    pub direction: SyncDirection,
    pub frequency: SyncFrequency,
    #[serde(default)]
    pub force_update: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}
