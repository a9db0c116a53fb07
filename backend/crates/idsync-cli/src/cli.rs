use crate::commands::Commands;

use clap::Parser;

#[derive(Parser)]
#[command(name = "idsync")]
#[command(about = "Reconcile the local user store with the remote identity provider")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Debug-level logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}
