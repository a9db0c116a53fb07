pub mod error;
pub mod schedules;
pub mod webhooks;
