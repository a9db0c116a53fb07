use crate::{registration_commands::RegistrationCommands, schedule_commands::ScheduleCommands};

use idsync_core::SyncDirection;
use idsync_sync::CleanupStore;

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run one reconciliation pass
    Sync {
        /// to-local, to-remote or bidirectional
        #[arg(long, default_value = "bidirectional", value_parser = parse_arg::<SyncDirection>)]
        direction: SyncDirection,

        /// Create remote accounts for local users that have none
        #[arg(long)]
        force: bool,

        /// Report planned changes without writing either store
        #[arg(long)]
        dry_run: bool,

        /// Restrict the run to one email address
        #[arg(long)]
        email: Option<String>,

        /// Stop between records once this much time has passed (e.g. "10m")
        #[arg(long, value_parser = humantime::parse_duration)]
        deadline: Option<Duration>,
    },

    /// Persisted sync schedules
    Schedules {
        #[command(subcommand)]
        action: ScheduleCommands,
    },

    /// Delete users from one or both stores
    Cleanup {
        /// local, remote or both
        #[arg(long, default_value = "both", value_parser = parse_arg::<CleanupStore>)]
        store: CleanupStore,

        /// Keep admin accounts
        #[arg(long)]
        preserve_admin: bool,

        /// Skip the interactive confirmation
        #[arg(long)]
        confirm: bool,
    },

    /// Report whether both stores are empty
    VerifyClean,

    /// Remove a user remotely, then locally
    DeleteUser {
        email: String,

        /// Remove the local row even when remote deletion fails
        #[arg(long)]
        force: bool,
    },

    /// Deferred remote registration
    Registrations {
        #[command(subcommand)]
        action: RegistrationCommands,
    },
}

/// clap value parser for the domain enums' `FromStr`
pub fn parse_arg<T>(value: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse::<T>().map_err(|e| e.to_string())
}
