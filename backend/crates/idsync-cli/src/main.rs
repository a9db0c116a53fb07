//! idsync - identity reconciliation operator CLI
//!
//! # Examples
//!
//! ```bash
//! # Preview a full reconciliation
//! idsync sync --direction bidirectional --force --dry-run --pretty
//!
//! # Run overdue schedules
//! idsync schedules run-due
//!
//! # Wipe both stores but keep admins
//! idsync cleanup --store both --preserve-admin
//! ```

use idsync_cli::{Cli, CliError, CliResult, CommandContext, CommandOutput, StdinConfirmation, execute};

use idsync_config::Config;
use idsync_logging::{LogTarget, LoggerSettings};
use idsync_provider::{HttpIdentityProvider, IdentityProvider};
use idsync_sync::{ShutdownCoordinator, SyncServices};

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::LevelFilter;

/// The command ran but left work undone
const EXIT_INCOMPLETE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    match run(cli).await {
        Ok(code) => code,
        Err(CliError::Aborted { message }) => {
            eprintln!("Aborted: {}", message);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<ExitCode> {
    let config = Config::load()?;
    config.validate()?;

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        config.logging.level.0
    };
    // stdout carries the command's JSON output
    idsync_logging::initialize(&LoggerSettings::new(
        level,
        LogTarget::Stderr,
        config.logging.colored,
    ))?;

    let pool = idsync_db::connect(&config.database_path()?, config.database.max_connections).await?;
    let provider: Arc<dyn IdentityProvider> = Arc::new(HttpIdentityProvider::new(&config.provider)?);
    let services = SyncServices::new(pool, provider, &config);

    let shutdown = ShutdownCoordinator::new();
    let shutdown_for_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted; stopping after the current record");
            shutdown_for_signal.shutdown();
        }
    });

    let ctx = CommandContext::new(services, shutdown);
    let output = execute(cli.command, &ctx, &mut StdinConfirmation).await?;

    print_output(&output, cli.pretty)?;

    Ok(if output.complete {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_INCOMPLETE)
    })
}

fn print_output(output: &CommandOutput, pretty: bool) -> CliResult<()> {
    let json = if pretty {
        serde_json::to_string_pretty(&output.value)?
    } else {
        serde_json::to_string(&output.value)?
    };
    println!("{}", json);
    Ok(())
}
