//! Periodic work that runs alongside the HTTP server

use crate::AppState;

use idsync_config::Config;
use idsync_sync::{CancellationSignal, RateLimitAwareRegistrar, ShutdownCoordinator};

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

/// Start the schedule driver and the registration sweeper when enabled.
/// Every task exits once `state.shutdown` fires.
pub fn spawn(state: &AppState, config: &Config) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();

    if config.scheduler.enabled {
        let schedules = Arc::clone(&state.services.schedules);
        let shutdown = state.shutdown.clone();
        let tick = Duration::from_secs(config.scheduler.tick_secs);

        handles.push(tokio::spawn(async move {
            schedules.run_driver(tick, shutdown).await;
        }));
    } else {
        log::info!("Schedule driver disabled");
    }

    if config.registrar.enabled {
        let registrar = Arc::clone(&state.services.registrar);
        let shutdown = state.shutdown.clone();
        let every = Duration::from_secs(config.registrar.sweep_interval_secs);

        handles.push(tokio::spawn(async move {
            run_registration_sweeper(registrar, every, shutdown).await;
        }));
    } else {
        log::info!("Registration sweeper disabled");
    }

    handles
}

pub async fn run_registration_sweeper(
    registrar: Arc<RateLimitAwareRegistrar>,
    every: Duration,
    coordinator: ShutdownCoordinator,
) {
    let mut guard = coordinator.subscribe_guard();
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    log::info!("Registration sweeper started (every {:?})", every);

    loop {
        tokio::select! {
            _ = guard.wait() => break,
            _ = interval.tick() => {
                let mut cancel = CancellationSignal::from_shutdown(&coordinator);
                match registrar.sweep(Utc::now(), &mut cancel).await {
                    Ok(report) if !report.candidates.is_empty() => {
                        log::info!("Registration sweep: {}", report.summary());
                    }
                    Ok(_) => log::debug!("Registration sweep: nothing pending"),
                    Err(e) => log::error!("Registration sweep failed: {}", e),
                }
            }
        }
    }

    log::info!("Registration sweeper stopped");
}
