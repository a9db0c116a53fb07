use std::time::Duration;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum RegistrationCommands {
    /// Register local accounts that are still missing remotely
    Process {
        /// Attempts per user while rate limited (default from config)
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Seconds to wait after a rate-limit response (default from config)
        #[arg(long)]
        delay: Option<u64>,

        #[arg(long)]
        dry_run: bool,

        /// Stop the sweep after this long (e.g. "5m")
        #[arg(long, value_parser = humantime::parse_duration)]
        deadline: Option<Duration>,
    },
}
