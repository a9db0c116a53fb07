use idsync_sync::ScheduleRunOutcome;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RunDueResponse {
    pub outcomes: Vec<ScheduleRunOutcome>,
}
