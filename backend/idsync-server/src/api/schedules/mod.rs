pub mod create_schedule_request;
pub mod run_due_query;
pub mod run_due_response;
pub mod schedule_dto;
pub mod schedule_list_response;
pub mod schedule_response;
pub mod schedules;
pub mod update_schedule_request;
