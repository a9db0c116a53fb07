use crate::{
    AppState, create_schedule, get_schedule, health, list_schedules, prometheus,
    receive_identity_webhook, run_due, run_schedule, update_schedule,
};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

/// Build the application router with all endpoints
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Identity provider webhooks
        .route("/webhooks/identity", post(receive_identity_webhook))
        // Health check endpoints
        .route("/health", get(health::health))
        .route("/live", get(health::liveness))
        .route("/ready", get(health::readiness))
        .route("/metrics", get(prometheus::metrics))
        // Schedule endpoints
        .route(
            "/api/v1/schedules",
            get(list_schedules).post(create_schedule),
        )
        .route("/api/v1/schedules/run-due", post(run_due))
        .route(
            "/api/v1/schedules/{id}",
            get(get_schedule).put(update_schedule),
        )
        .route("/api/v1/schedules/{id}/run", post(run_schedule))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
