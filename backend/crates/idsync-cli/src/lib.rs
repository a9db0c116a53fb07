//! idsync-cli library
//!
//! Argument definitions and command execution, exported for the binary and
//! for tests.

pub mod cli;
pub mod commands;
pub mod confirmation;
pub mod error;
pub mod registration_commands;
pub mod runner;
pub mod schedule_commands;


pub use cli::Cli;
pub use commands::Commands;
pub use confirmation::{Confirmation, StdinConfirmation};
pub use error::{CliError, Result as CliResult};
pub use registration_commands::RegistrationCommands;
pub use runner::{CommandContext, CommandOutput, execute};
pub use schedule_commands::ScheduleCommands;
