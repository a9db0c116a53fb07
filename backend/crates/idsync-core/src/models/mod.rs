pub mod local_user;
pub mod remote_user;
pub mod sync_direction;
pub mod sync_frequency;
pub mod sync_run;
pub mod sync_schedule;
pub mod webhook_event;
