mod error;
mod schedules;
