use crate::{LOCKOUT_MINUTES, LocalUser, MAX_FAILED_LOGIN_ATTEMPTS};

use chrono::{Duration, Utc};
use googletest::prelude::*;

#[test]
fn given_mixed_case_email_when_created_then_email_is_case_folded() {
    // Given / When
    let user = LocalUser::new("  Alice@Example.COM ", "alice".to_string());

    // Then
    assert_that!(user.email, eq("alice@example.com"));
    assert_that!(user.email_local_part(), eq("alice"));
    assert_that!(user.external_id, none());
    assert_that!(user.verified, eq(false));
    assert_that!(user.is_active(), eq(true));
}

#[test]
fn given_four_failures_when_fifth_failure_then_account_locked_for_lockout_window() {
    // Given
    let now = Utc::now();
    let mut user = LocalUser::new("bob@example.com", "bob".to_string());
    for _ in 0..MAX_FAILED_LOGIN_ATTEMPTS - 1 {
        assert_that!(user.register_failed_login(now), eq(false));
    }

    // When
    let locked = user.register_failed_login(now);

    // Then
    assert_that!(locked, eq(true));
    assert_that!(user.is_locked(now), eq(true));
    assert_that!(
        user.is_locked(now + Duration::minutes(LOCKOUT_MINUTES) + Duration::seconds(1)),
        eq(false)
    );
}

#[test]
fn given_locked_account_when_reset_then_unlocked() {
    // Given
    let now = Utc::now();
    let mut user = LocalUser::new("carol@example.com", "carol".to_string());
    for _ in 0..MAX_FAILED_LOGIN_ATTEMPTS {
        user.register_failed_login(now);
    }

    // When
    user.reset_login_attempts();

    // Then
    assert_that!(user.failed_login_attempts, eq(0));
    assert_that!(user.is_locked(now), eq(false));
}
