use idsync_core::SyncRun;

use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// Metrics recorder for the sync engine
#[derive(Clone)]
pub struct Metrics {
    prefix: &'static str,
}

impl Metrics {
    pub fn new() -> Self {
        Self { prefix: "idsync" }
    }

    pub fn webhook_received(&self, event_type: &str) {
        counter!(format!("{}.webhook.received", self.prefix)).increment(1);
        counter!(format!("{}.webhook.received.{}", self.prefix, event_type)).increment(1);
    }

    pub fn webhook_rejected(&self, reason: &str) {
        counter!(format!("{}.webhook.rejected", self.prefix)).increment(1);
        counter!(format!("{}.webhook.rejected.{}", self.prefix, reason)).increment(1);
    }

    pub fn webhook_failed(&self) {
        counter!(format!("{}.webhook.failed", self.prefix)).increment(1);
    }

    pub fn webhook_latency(&self, duration: Duration) {
        histogram!(format!("{}.webhook.latency_ms", self.prefix))
            .record(duration.as_millis() as f64);
    }

    pub fn sync_completed(&self, run: &SyncRun, duration: Duration) {
        counter!(format!("{}.sync.runs", self.prefix)).increment(1);
        counter!(format!("{}.sync.created", self.prefix)).increment(run.created as u64);
        counter!(format!("{}.sync.updated", self.prefix)).increment(run.updated as u64);
        counter!(format!("{}.sync.errors", self.prefix)).increment(run.error_count() as u64);
        counter!(format!("{}.sync.discrepancies", self.prefix))
            .increment(run.discrepancies.len() as u64);
        if run.cancelled {
            counter!(format!("{}.sync.cancelled", self.prefix)).increment(1);
        }
        histogram!(format!("{}.sync.duration_ms", self.prefix))
            .record(duration.as_millis() as f64);
    }

    pub fn sync_failed(&self) {
        counter!(format!("{}.sync.failed", self.prefix)).increment(1);
    }

    pub fn schedule_run(&self, outcome: &str) {
        counter!(format!("{}.schedules.{}", self.prefix, outcome)).increment(1);
    }

    pub fn registrar_sweep(&self, candidates: usize, registered: usize, linked: usize, failed: usize) {
        counter!(format!("{}.registrar.sweeps", self.prefix)).increment(1);
        counter!(format!("{}.registrar.registered", self.prefix)).increment(registered as u64);
        counter!(format!("{}.registrar.linked", self.prefix)).increment(linked as u64);
        counter!(format!("{}.registrar.failed", self.prefix)).increment(failed as u64);
        gauge!(format!("{}.registrar.pending", self.prefix)).set(candidates as f64);
    }

    pub fn registrar_rate_limited(&self) {
        counter!(format!("{}.registrar.rate_limited", self.prefix)).increment(1);
    }

    pub fn remote_deletion(&self, outcome: &str) {
        counter!(format!("{}.deletion.{}", self.prefix, outcome)).increment(1);
    }

    pub fn provider_error(&self, kind: &str) {
        counter!(format!("{}.provider.errors.{}", self.prefix, kind)).increment(1);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
