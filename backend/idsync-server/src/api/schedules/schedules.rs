//! Sync schedule REST API handlers

use crate::{
    ApiResult, AppState, CreateScheduleRequest, RunDueQuery, RunDueResponse, ScheduleDto,
    ScheduleListResponse, ScheduleResponse, UpdateScheduleRequest,
};

use idsync_sync::{CancellationSignal, ScheduleRunOutcome};

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/v1/schedules
pub async fn list_schedules(
    State(state): State<AppState>,
) -> ApiResult<Json<ScheduleListResponse>> {
    let schedules = state.services.schedules.list().await?;

    Ok(Json(ScheduleListResponse {
        schedules: schedules.into_iter().map(ScheduleDto::from).collect(),
    }))
}

/// GET /api/v1/schedules/{id}
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ScheduleResponse>> {
    let schedule_id = Uuid::parse_str(&id)?;
    let schedule = state.services.schedules.get(schedule_id).await?;

    Ok(Json(ScheduleResponse {
        schedule: schedule.into(),
    }))
}

/// POST /api/v1/schedules
///
/// `next_run_at` is derived from the frequency at creation time.
pub async fn create_schedule(
    State(state): State<AppState>,
    Json(req): Json<CreateScheduleRequest>,
) -> ApiResult<(StatusCode, Json<ScheduleResponse>)> {
    let schedule = state
        .services
        .schedules
        .create(req.direction, req.frequency, req.force_update, req.is_active)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ScheduleResponse {
            schedule: schedule.into(),
        }),
    ))
}

/// PUT /api/v1/schedules/{id}
pub async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateScheduleRequest>,
) -> ApiResult<Json<ScheduleResponse>> {
    let schedule_id = Uuid::parse_str(&id)?;
    let schedule = state
        .services
        .schedules
        .update(schedule_id, req.into())
        .await?;

    Ok(Json(ScheduleResponse {
        schedule: schedule.into(),
    }))
}

/// POST /api/v1/schedules/{id}/run
///
/// Manual "run now". A schedule whose lock is held reports `skipped`.
pub async fn run_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ScheduleRunOutcome>> {
    let schedule_id = Uuid::parse_str(&id)?;
    let mut cancel = CancellationSignal::from_shutdown(&state.shutdown);

    let outcome = state
        .services
        .schedules
        .run_now(schedule_id, &mut cancel)
        .await?;

    Ok(Json(outcome))
}

/// POST /api/v1/schedules/run-due
pub async fn run_due(
    State(state): State<AppState>,
    Query(query): Query<RunDueQuery>,
) -> ApiResult<Json<RunDueResponse>> {
    let mut cancel = CancellationSignal::from_shutdown(&state.shutdown);

    let outcomes = state
        .services
        .schedules
        .run_due(query.force_run_all, Utc::now(), &mut cancel)
        .await?;

    Ok(Json(RunDueResponse { outcomes }))
}
