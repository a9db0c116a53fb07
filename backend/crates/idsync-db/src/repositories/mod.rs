pub mod local_user_repository;
pub mod sync_schedule_repository;
