//! Persisted sync schedules and the driver that runs them.

use crate::{
    CancellationSignal, Metrics, ReconciliationEngine, Result as SyncResult, ShutdownCoordinator,
    SyncError, SyncOptions,
};

use idsync_config::ScheduleSeed;
use idsync_core::{SyncDirection, SyncFrequency, SyncRun, SyncSchedule};
use idsync_db::SyncScheduleRepository;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, Duration as ChronoDuration, NaiveTime, Timelike, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Days added when the current day is already a Monday
pub const WEEKLY_DAYS_AHEAD_ON_MONDAY: i64 = 7;

/// Next run time for a cadence, in UTC. Always strictly after `now`.
///
/// - hourly: top of the next hour
/// - daily: midnight starting the next day
/// - weekly: midnight of the next Monday (Monday = 0 .. Sunday = 6)
pub fn compute_next_run(frequency: SyncFrequency, now: DateTime<Utc>) -> DateTime<Utc> {
    match frequency {
        SyncFrequency::Hourly => {
            let hour_start = now
                .date_naive()
                .and_time(NaiveTime::MIN)
                .and_utc()
                + ChronoDuration::hours(i64::from(now.hour()));
            hour_start + ChronoDuration::hours(1)
        }
        SyncFrequency::Daily => midnight_after(now, 1),
        SyncFrequency::Weekly => {
            let weekday = i64::from(now.weekday().num_days_from_monday());
            let days_ahead = if weekday > 0 {
                7 - weekday
            } else {
                WEEKLY_DAYS_AHEAD_ON_MONDAY
            };
            midnight_after(now, days_ahead)
        }
    }
}

fn midnight_after(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    (now.date_naive() + ChronoDuration::days(days))
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// Editable fields of a schedule; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulePatch {
    pub direction: Option<SyncDirection>,
    pub frequency: Option<SyncFrequency>,
    pub is_active: Option<bool>,
    pub force_update: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScheduleRunStatus {
    Completed { summary: String, errors: usize },
    Failed { message: String },
    /// Another run holds the schedule's lock
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleRunOutcome {
    pub schedule_id: Uuid,
    pub direction: SyncDirection,
    #[serde(flatten)]
    pub status: ScheduleRunStatus,
    pub next_run_at: Option<DateTime<Utc>>,
}

pub struct ScheduleManager {
    schedules: SyncScheduleRepository,
    engine: Arc<ReconciliationEngine>,
    stale_lock: Duration,
    metrics: Metrics,
}

impl ScheduleManager {
    pub fn new(
        schedules: SyncScheduleRepository,
        engine: Arc<ReconciliationEngine>,
        stale_lock: Duration,
        metrics: Metrics,
    ) -> Self {
        Self {
            schedules,
            engine,
            stale_lock,
            metrics,
        }
    }

    pub async fn list(&self) -> SyncResult<Vec<SyncSchedule>> {
        Ok(self.schedules.list_all().await?)
    }

    pub async fn get(&self, id: Uuid) -> SyncResult<SyncSchedule> {
        self.schedules
            .find_by_id(id)
            .await?
            .ok_or_else(|| SyncError::not_found(format!("schedule {}", id)))
    }

    pub async fn create(
        &self,
        direction: SyncDirection,
        frequency: SyncFrequency,
        force_update: bool,
        is_active: bool,
    ) -> SyncResult<SyncSchedule> {
        let now = Utc::now();
        let mut schedule = SyncSchedule::new(
            direction,
            frequency,
            force_update,
            compute_next_run(frequency, now),
        );
        schedule.is_active = is_active;

        self.schedules.create(&schedule).await?;
        log::info!(
            "Created {} {} schedule {} (next run {})",
            frequency,
            direction,
            schedule.id,
            schedule.next_run_at
        );
        Ok(schedule)
    }

    /// A frequency change recomputes `next_run_at` from now
    pub async fn update(&self, id: Uuid, patch: SchedulePatch) -> SyncResult<SyncSchedule> {
        let mut schedule = self.get(id).await?;
        let now = Utc::now();

        if let Some(direction) = patch.direction {
            schedule.direction = direction;
        }
        if let Some(frequency) = patch.frequency
            && frequency != schedule.frequency
        {
            schedule.frequency = frequency;
            schedule.next_run_at = compute_next_run(frequency, now);
        }
        if let Some(is_active) = patch.is_active {
            schedule.is_active = is_active;
        }
        if let Some(force_update) = patch.force_update {
            schedule.force_update = force_update;
        }
        schedule.updated_at = now;

        if !self.schedules.update(&schedule).await? {
            return Err(SyncError::not_found(format!("schedule {}", id)));
        }
        Ok(schedule)
    }

    /// Insert configured schedules when none exist yet. Returns how many.
    pub async fn seed(&self, seeds: &[ScheduleSeed]) -> SyncResult<usize> {
        if seeds.is_empty() || self.schedules.count().await? > 0 {
            return Ok(0);
        }

        for seed in seeds {
            self.create(
                seed.direction,
                seed.frequency,
                seed.force_update,
                seed.is_active,
            )
            .await?;
        }
        log::info!("Seeded {} schedules from configuration", seeds.len());
        Ok(seeds.len())
    }

    /// Run every due schedule, or every active one with `force_run_all`
    pub async fn run_due(
        &self,
        force_run_all: bool,
        now: DateTime<Utc>,
        cancel: &mut CancellationSignal,
    ) -> SyncResult<Vec<ScheduleRunOutcome>> {
        let schedules = if force_run_all {
            self.schedules.list_active().await?
        } else {
            self.schedules.find_due(now).await?
        };

        if schedules.is_empty() {
            log::debug!("No schedules due");
        }

        let mut outcomes = Vec::with_capacity(schedules.len());
        for schedule in &schedules {
            if cancel.is_cancelled() {
                break;
            }
            outcomes.push(self.run_schedule(schedule, now, cancel).await?);
        }
        Ok(outcomes)
    }

    /// Manual trigger, regardless of `next_run_at`
    pub async fn run_now(
        &self,
        id: Uuid,
        cancel: &mut CancellationSignal,
    ) -> SyncResult<ScheduleRunOutcome> {
        let schedule = self.get(id).await?;
        self.run_schedule(&schedule, Utc::now(), cancel).await
    }

    async fn run_schedule(
        &self,
        schedule: &SyncSchedule,
        now: DateTime<Utc>,
        cancel: &mut CancellationSignal,
    ) -> SyncResult<ScheduleRunOutcome> {
        let stale_before = now
            - ChronoDuration::from_std(self.stale_lock).unwrap_or(ChronoDuration::hours(1));

        if !self
            .schedules
            .try_claim(schedule.id, now, stale_before)
            .await?
        {
            log::warn!("Schedule {} is already running, skipping", schedule.id);
            self.metrics.schedule_run("skipped");
            return Ok(ScheduleRunOutcome {
                schedule_id: schedule.id,
                direction: schedule.direction,
                status: ScheduleRunStatus::Skipped {
                    reason: "already running".to_string(),
                },
                next_run_at: None,
            });
        }

        log::info!(
            "Running schedule {} ({} {})",
            schedule.id,
            schedule.frequency,
            schedule.direction
        );

        let options = SyncOptions {
            direction: schedule.direction,
            force: schedule.force_update,
            dry_run: false,
            email_filter: None,
        };
        let result: SyncResult<SyncRun> = self.engine.run(&options, cancel).await;

        let (status_text, status) = match result {
            Ok(run) => {
                self.metrics.schedule_run("completed");
                let summary = run.summary();
                (
                    summary.clone(),
                    ScheduleRunStatus::Completed {
                        summary,
                        errors: run.error_count(),
                    },
                )
            }
            Err(e) => {
                log::error!("Schedule {} failed: {}", schedule.id, e);
                self.metrics.schedule_run("failed");
                (
                    format!("ERROR: {}", e),
                    ScheduleRunStatus::Failed {
                        message: e.to_string(),
                    },
                )
            }
        };

        let next_run_at = compute_next_run(schedule.frequency, now);
        self.schedules
            .record_run(schedule.id, now, &status_text, next_run_at)
            .await?;

        Ok(ScheduleRunOutcome {
            schedule_id: schedule.id,
            direction: schedule.direction,
            status,
            next_run_at: Some(next_run_at),
        })
    }

    /// Periodic driver; returns once shutdown is triggered
    pub async fn run_driver(&self, tick: Duration, coordinator: ShutdownCoordinator) {
        let mut guard = coordinator.subscribe_guard();
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        log::info!("Schedule driver started (tick every {:?})", tick);

        loop {
            tokio::select! {
                _ = guard.wait() => break,
                _ = interval.tick() => {
                    let mut cancel = CancellationSignal::from_shutdown(&coordinator);
                    if let Err(e) = self.run_due(false, Utc::now(), &mut cancel).await {
                        log::error!("Schedule driver tick failed: {}", e);
                    }
                }
            }
        }

        log::info!("Schedule driver stopped");
    }
}
