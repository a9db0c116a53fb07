pub mod connection;
pub mod error;
pub mod repositories;

pub use connection::pool::{connect, connect_in_memory, run_migrations};
pub use error::{DbError, Result};
pub use repositories::local_user_repository::LocalUserRepository;
pub use repositories::sync_schedule_repository::SyncScheduleRepository;
