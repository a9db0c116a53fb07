use crate::commands::parse_arg;

use idsync_core::{SyncDirection, SyncFrequency};

use std::time::Duration;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum ScheduleCommands {
    /// List all schedules
    List,

    /// Create a schedule; the first run is derived from the frequency
    Create {
        #[arg(long, value_parser = parse_arg::<SyncDirection>)]
        direction: SyncDirection,

        /// hourly, daily or weekly
        #[arg(long, value_parser = parse_arg::<SyncFrequency>)]
        frequency: SyncFrequency,

        #[arg(long)]
        force_update: bool,

        /// Create paused
        #[arg(long)]
        inactive: bool,
    },

    /// Run every schedule whose next run has passed
    RunDue {
        /// Run every active schedule regardless of its next run
        #[arg(long)]
        force_run_all: bool,

        /// Abandon the remaining records after this long (e.g. "30m")
        #[arg(long, value_parser = humantime::parse_duration)]
        deadline: Option<Duration>,
    },

    /// Run one schedule now
    Run {
        id: String,

        #[arg(long, value_parser = humantime::parse_duration)]
        deadline: Option<Duration>,
    },
}
