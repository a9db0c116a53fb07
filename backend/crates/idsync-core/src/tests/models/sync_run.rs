use crate::{SkipReason, SyncDirection, SyncRun};

use googletest::prelude::*;

#[test]
fn given_run_with_skips_and_errors_when_summarized_then_counts_reported() {
    // Given
    let mut run = SyncRun::start(SyncDirection::ToRemote, false);
    run.created = 2;
    run.updated = 1;
    run.record_skip("b@x.com", SkipReason::NeedsForce);
    run.record_error("e@x.com", "provider unavailable");

    // When
    let summary = run.summary();

    // Then
    assert_that!(
        summary,
        eq("to-remote: created=2 updated=1 unchanged=0 skipped=1 errors=1 (1 need --force)")
    );
    assert_that!(run.error_count(), eq(1));
}

#[test]
fn given_cancelled_dry_run_when_summarized_then_flags_appended() {
    // Given
    let mut run = SyncRun::start(SyncDirection::ToLocal, true);
    run.planned.push("create local a@x.com".to_string());
    run.cancelled = true;

    // When
    let summary = run.summary();

    // Then
    assert_that!(summary, contains_substring("[dry run, 1 planned]"));
    assert_that!(summary, ends_with("[cancelled]"));
}
