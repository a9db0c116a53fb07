//! Command execution against in-process sync services

use crate::{
    CliError, CliResult, Commands, Confirmation, RegistrationCommands, ScheduleCommands,
};

use idsync_sync::{
    CancellationSignal, CleanupStore, ScheduleRunOutcome, ScheduleRunStatus, ShutdownCoordinator,
    SyncOptions, SyncServices,
};

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

pub struct CommandContext {
    pub services: SyncServices,
    pub shutdown: ShutdownCoordinator,
}

impl CommandContext {
    pub fn new(services: SyncServices, shutdown: ShutdownCoordinator) -> Self {
        Self { services, shutdown }
    }

    /// Trips on Ctrl-C, and on `deadline` when one was given
    fn cancellation(&self, deadline: Option<Duration>) -> CancellationSignal {
        let signal = CancellationSignal::from_shutdown(&self.shutdown);
        match deadline {
            Some(budget) => signal.with_deadline(budget),
            None => signal,
        }
    }
}

/// JSON result of a command. `complete` is false when the command ran but
/// left work undone (record errors, a dirty store, a failed schedule).
#[derive(Debug)]
pub struct CommandOutput {
    pub value: Value,
    pub complete: bool,
}

impl CommandOutput {
    fn new<T: Serialize>(value: &T, complete: bool) -> CliResult<Self> {
        Ok(Self {
            value: serde_json::to_value(value)?,
            complete,
        })
    }

    /// Adds a one-line `summary` field to an object result
    fn with_summary(mut self, summary: String) -> Self {
        if let Value::Object(ref mut map) = self.value {
            map.insert("summary".to_string(), Value::String(summary));
        }
        self
    }
}

pub async fn execute(
    command: Commands,
    ctx: &CommandContext,
    confirmation: &mut dyn Confirmation,
) -> CliResult<CommandOutput> {
    match command {
        Commands::Sync {
            direction,
            force,
            dry_run,
            email,
            deadline,
        } => {
            let options = SyncOptions {
                direction,
                force,
                dry_run,
                email_filter: email,
            };
            let run = ctx
                .services
                .engine
                .run(&options, &mut ctx.cancellation(deadline))
                .await?;

            let summary = run.summary();
            log::info!("{}", summary);
            Ok(CommandOutput::new(&run, run.errors.is_empty() && !run.cancelled)?
                .with_summary(summary))
        }

        Commands::Schedules { action } => execute_schedules(action, ctx).await,

        Commands::Cleanup {
            store,
            preserve_admin,
            confirm,
        } => {
            if !confirm {
                let prompt = cleanup_prompt(ctx, store, preserve_admin).await?;
                if !confirmation.confirm(&prompt)? {
                    return Err(CliError::Aborted {
                        message: "cleanup not confirmed".to_string(),
                    });
                }
            }

            let report = ctx.services.cleanup.purge(store, preserve_admin).await?;
            CommandOutput::new(&report, report.remote_failed.is_empty())
        }

        Commands::VerifyClean => {
            let report = ctx.services.cleanup.verify_clean().await?;
            if report.is_clean() {
                log::info!("Both stores are empty");
            } else {
                log::warn!(
                    "Stores not clean: {} local row(s), {} remote user(s)",
                    report.local_total,
                    report.remote_total
                );
            }
            CommandOutput::new(&report, report.is_clean())
        }

        Commands::DeleteUser { email, force } => {
            let report = ctx
                .services
                .deletion
                .delete_local_user(&email, force)
                .await?;
            CommandOutput::new(&report, report.remote_error.is_none())
        }

        Commands::Registrations { action } => match action {
            RegistrationCommands::Process {
                max_attempts,
                delay,
                dry_run,
                deadline,
            } => {
                let mut options = ctx.services.registrar.options().clone();
                if let Some(attempts) = max_attempts {
                    options.max_attempts = attempts.max(1);
                }
                if let Some(secs) = delay {
                    options.rate_limit_delay = Duration::from_secs(secs);
                }
                options.dry_run = dry_run;

                let report = ctx
                    .services
                    .registrar
                    .with_options(options)
                    .sweep(Utc::now(), &mut ctx.cancellation(deadline))
                    .await?;

                let summary = report.summary();
                log::info!("Registrations: {}", summary);
                Ok(
                    CommandOutput::new(&report, report.failed.is_empty() && !report.cancelled)?
                        .with_summary(summary),
                )
            }
        },
    }
}

async fn execute_schedules(
    action: ScheduleCommands,
    ctx: &CommandContext,
) -> CliResult<CommandOutput> {
    let schedules = &ctx.services.schedules;

    match action {
        ScheduleCommands::List => CommandOutput::new(&schedules.list().await?, true),
        ScheduleCommands::Create {
            direction,
            frequency,
            force_update,
            inactive,
        } => {
            let schedule = schedules
                .create(direction, frequency, force_update, !inactive)
                .await?;
            CommandOutput::new(&schedule, true)
        }
        ScheduleCommands::RunDue {
            force_run_all,
            deadline,
        } => {
            let outcomes = schedules
                .run_due(force_run_all, Utc::now(), &mut ctx.cancellation(deadline))
                .await?;
            let complete = outcomes.iter().all(|outcome| !is_failed(outcome));
            CommandOutput::new(&outcomes, complete)
        }
        ScheduleCommands::Run { id, deadline } => {
            let schedule_id = Uuid::parse_str(&id)?;
            let outcome = schedules
                .run_now(schedule_id, &mut ctx.cancellation(deadline))
                .await?;
            CommandOutput::new(&outcome, !is_failed(&outcome))
        }
    }
}

fn is_failed(outcome: &ScheduleRunOutcome) -> bool {
    matches!(outcome.status, ScheduleRunStatus::Failed { .. })
}

async fn cleanup_prompt(
    ctx: &CommandContext,
    store: CleanupStore,
    preserve_admin: bool,
) -> CliResult<String> {
    let mut targets = Vec::new();
    if store.includes_local() {
        let count = ctx.services.cleanup.local_purge_count(preserve_admin).await?;
        targets.push(format!("{} local user row(s)", count));
    }
    if store.includes_remote() {
        targets.push("every remote user".to_string());
    }

    Ok(format!(
        "This will permanently delete {}{}.",
        targets.join(" and "),
        if preserve_admin {
            " (admins preserved)"
        } else {
            ""
        }
    ))
}
