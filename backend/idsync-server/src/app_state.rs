use idsync_sync::{ShutdownCoordinator, SyncServices};

use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::SqlitePool;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub services: SyncServices,
    pub shutdown: ShutdownCoordinator,
    /// Absent when the recorder could not be installed (e.g. in tests)
    pub metrics_handle: Option<PrometheusHandle>,
}
