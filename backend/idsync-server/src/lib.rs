pub mod api;
pub mod app_state;
pub mod background;
pub mod error;
pub mod health;
pub mod logger;
pub mod prometheus;
pub mod routes;

#[cfg(test)]
mod tests;

pub use api::{
    error::ApiError,
    error::Result as ApiResult,
    schedules::{
        create_schedule_request::CreateScheduleRequest,
        run_due_query::RunDueQuery,
        run_due_response::RunDueResponse,
        schedule_dto::ScheduleDto,
        schedule_list_response::ScheduleListResponse,
        schedule_response::ScheduleResponse,
        schedules::{create_schedule, get_schedule, list_schedules, run_due, run_schedule, update_schedule},
        update_schedule_request::UpdateScheduleRequest,
    },
    webhooks::{
        LEGACY_SIGNATURE_HEADER, REQUEST_ID_HEADER, SIGNATURE_HEADER, receive_identity_webhook,
    },
};
pub use app_state::AppState;
pub use error::{Result as ServerErrorResult, ServerError};
pub use routes::build_router;
