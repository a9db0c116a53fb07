use crate::{WEEKLY_DAYS_AHEAD_ON_MONDAY, compute_next_run};

use idsync_core::SyncFrequency;

use chrono::{DateTime, TimeZone, Utc};
use googletest::prelude::*;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

#[test]
fn given_daily_when_computing_next_run_then_next_midnight_regardless_of_time() {
    // Given
    let early = at(2024, 3, 14, 0, 0, 1);
    let late = at(2024, 3, 14, 23, 59, 59);

    // When / Then
    assert_that!(
        compute_next_run(SyncFrequency::Daily, early),
        eq(at(2024, 3, 15, 0, 0, 0))
    );
    assert_that!(
        compute_next_run(SyncFrequency::Daily, late),
        eq(at(2024, 3, 15, 0, 0, 0))
    );
}

#[test]
fn given_daily_at_month_end_when_computing_next_run_then_rolls_over() {
    assert_that!(
        compute_next_run(SyncFrequency::Daily, at(2024, 2, 29, 12, 0, 0)),
        eq(at(2024, 3, 1, 0, 0, 0))
    );
}

#[test]
fn given_hourly_when_computing_next_run_then_top_of_next_hour() {
    assert_that!(
        compute_next_run(SyncFrequency::Hourly, at(2024, 3, 14, 10, 30, 15)),
        eq(at(2024, 3, 14, 11, 0, 0))
    );
    assert_that!(
        compute_next_run(SyncFrequency::Hourly, at(2024, 12, 31, 23, 5, 0)),
        eq(at(2025, 1, 1, 0, 0, 0))
    );
}

#[test]
fn given_hourly_exactly_on_the_hour_when_computing_next_run_then_following_hour() {
    assert_that!(
        compute_next_run(SyncFrequency::Hourly, at(2024, 3, 14, 10, 0, 0)),
        eq(at(2024, 3, 14, 11, 0, 0))
    );
}

#[test]
fn given_midweek_when_computing_weekly_next_run_then_next_monday_midnight() {
    // 2024-03-14 is a Thursday
    assert_that!(
        compute_next_run(SyncFrequency::Weekly, at(2024, 3, 14, 9, 0, 0)),
        eq(at(2024, 3, 18, 0, 0, 0))
    );
    // Sunday
    assert_that!(
        compute_next_run(SyncFrequency::Weekly, at(2024, 3, 17, 23, 0, 0)),
        eq(at(2024, 3, 18, 0, 0, 0))
    );
}

#[test]
fn given_monday_when_computing_weekly_next_run_then_following_monday() {
    // 2024-03-18 is a Monday
    let monday = at(2024, 3, 18, 0, 0, 0);

    let next = compute_next_run(SyncFrequency::Weekly, monday);

    assert_that!(WEEKLY_DAYS_AHEAD_ON_MONDAY, eq(7));
    assert_that!(next, eq(at(2024, 3, 25, 0, 0, 0)));
}
