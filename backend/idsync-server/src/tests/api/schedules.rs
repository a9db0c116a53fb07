use crate::{CreateScheduleRequest, ScheduleDto, UpdateScheduleRequest};

use idsync_core::{SyncDirection, SyncFrequency, SyncSchedule};
use idsync_sync::SchedulePatch;

use chrono::{TimeZone, Utc};
use googletest::prelude::*;

#[test]
fn given_minimal_create_body_when_parsed_then_defaults_applied() {
    // Given
    let body = r#"{"direction": "to-remote", "frequency": "hourly"}"#;

    // When
    let req: CreateScheduleRequest = serde_json::from_str(body).unwrap();

    // Then
    assert_that!(req.direction, eq(SyncDirection::ToRemote));
    assert_that!(req.frequency, eq(SyncFrequency::Hourly));
    assert_that!(req.force_update, eq(false));
    assert_that!(req.is_active, eq(true));
}

#[test]
fn given_unknown_frequency_when_parsed_then_rejected() {
    // Given
    let body = r#"{"direction": "to-local", "frequency": "monthly"}"#;

    // When
    let parsed = serde_json::from_str::<CreateScheduleRequest>(body);

    // Then
    assert_that!(parsed.is_err(), eq(true));
}

#[test]
fn given_partial_update_when_converted_then_only_named_fields_set() {
    // Given
    let req: UpdateScheduleRequest = serde_json::from_str(r#"{"is_active": false}"#).unwrap();

    // When
    let patch = SchedulePatch::from(req);

    // Then
    assert_that!(
        patch,
        eq(&SchedulePatch {
            is_active: Some(false),
            ..SchedulePatch::default()
        })
    );
}

#[test]
fn given_locked_schedule_when_mapped_then_running_and_unix_timestamps() {
    // Given
    let next = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
    let mut schedule =
        SyncSchedule::new(SyncDirection::Bidirectional, SyncFrequency::Daily, true, next);
    schedule.locked_at = Some(next);

    // When
    let dto = ScheduleDto::from(schedule.clone());

    // Then
    assert_that!(dto.id, eq(&schedule.id.to_string()));
    assert_that!(dto.next_run_at, eq(next.timestamp()));
    assert_that!(dto.running, eq(true));
    assert_that!(dto.last_run_at, none());
}
