use crate::RemoteUser;

use chrono::{TimeZone, Utc};
use googletest::prelude::*;
use serde_json::json;

#[test]
fn given_confirmation_timestamp_when_checked_then_confirmed() {
    // Given
    let user: RemoteUser = serde_json::from_value(json!({
        "id": "ext-1",
        "email": "A@X.com",
        "email_confirmed_at": "2024-05-01T10:00:00.123456Z"
    }))
    .unwrap();

    // Then
    assert_that!(user.is_confirmed(), eq(true));
    assert_that!(user.normalized_email(), some(eq("a@x.com")));
}

#[test]
fn given_metadata_flag_only_when_checked_then_confirmed() {
    // Given
    let user: RemoteUser = serde_json::from_value(json!({
        "id": "ext-2",
        "email": "b@x.com",
        "raw_user_meta_data": { "email_verified": true, "username": "bee" }
    }))
    .unwrap();

    // Then
    assert_that!(user.is_confirmed(), eq(true));
    assert_that!(user.username_hint(), some(eq("bee")));
}

#[test]
fn given_garbage_optional_fields_when_decoded_then_fields_are_ignored() {
    // Given
    let value = json!({
        "id": "ext-3",
        "email": "c@x.com",
        "email_confirmed_at": "not-a-date",
        "banned_until": "none",
        "user_metadata": "oops"
    });

    // When
    let user: RemoteUser = serde_json::from_value(value).unwrap();

    // Then
    assert_that!(user.email_confirmed_at, none());
    assert_that!(user.banned_until, none());
    assert_that!(user.user_metadata.is_empty(), eq(true));
    assert_that!(user.is_confirmed(), eq(false));
}

#[test]
fn given_postgres_timestamp_when_decoded_then_parsed() {
    // Given
    let user: RemoteUser = serde_json::from_value(json!({
        "id": "ext-4",
        "confirmed_at": "2024-05-01 10:00:00.5+00"
    }))
    .unwrap();

    // Then
    assert_that!(user.confirmed_at.is_some(), eq(true));
    assert_that!(user.normalized_email(), none());
}

#[test]
fn given_future_ban_when_checked_then_banned() {
    // Given
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let user: RemoteUser = serde_json::from_value(json!({
        "id": "ext-5",
        "email": "d@x.com",
        "banned_until": "2999-01-01T00:00:00Z"
    }))
    .unwrap();

    // Then
    assert_that!(user.is_banned(now), eq(true));
}
