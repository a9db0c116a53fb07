//! Prometheus exposition of the `idsync.*` metrics

use crate::{ApiError, ApiResult, AppState};

use std::panic::Location;

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use error_location::ErrorLocation;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Install the global recorder. Fails if one is already installed.
pub fn install_recorder() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::warn!("Prometheus recorder not installed, /metrics disabled: {}", e);
            None
        }
    }
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> ApiResult<Response> {
    let handle = state.metrics_handle.as_ref().ok_or_else(|| ApiError::NotFound {
        message: "Metrics exporter is not installed".to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        handle.render(),
    )
        .into_response())
}
