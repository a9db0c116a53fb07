mod common;

use common::{create_test_pool, create_test_user};

use idsync_db::LocalUserRepository;

use chrono::{Duration, Utc};
use googletest::prelude::*;

#[tokio::test]
async fn given_created_user_when_found_by_mixed_case_email_then_returned() {
    // Given
    let pool = create_test_pool().await;
    let repo = LocalUserRepository::new(pool);
    let user = create_test_user("alice@example.com");
    repo.create(&user).await.unwrap();

    // When
    let found = repo.find_active_by_email("ALICE@Example.com").await.unwrap();

    // Then
    assert_that!(found, some(anything()));
    let found = found.unwrap();
    assert_that!(found.id, eq(user.id));
    assert_that!(found.username, eq("alice"));
    assert_that!(found.created_at.timestamp(), eq(user.created_at.timestamp()));
}

#[tokio::test]
async fn given_soft_deleted_user_when_counting_then_excluded() {
    // Given
    let pool = create_test_pool().await;
    let repo = LocalUserRepository::new(pool);
    let keep = create_test_user("keep@example.com");
    let gone = create_test_user("gone@example.com");
    repo.create(&keep).await.unwrap();
    repo.create(&gone).await.unwrap();

    // When
    let deleted = repo.soft_delete(gone.id, Utc::now()).await.unwrap();

    // Then
    assert_that!(deleted, eq(true));
    assert_that!(repo.count_active().await.unwrap(), eq(1));
    assert_that!(repo.list_active(None).await.unwrap(), len(eq(1)));
    assert_that!(repo.list_all(None).await.unwrap(), len(eq(2)));
    assert_that!(
        repo.find_active_by_email("gone@example.com").await.unwrap(),
        none()
    );
    assert_that!(repo.is_deleted_email("gone@example.com").await.unwrap(), eq(true));
    assert_that!(repo.is_deleted_email("keep@example.com").await.unwrap(), eq(false));
}

#[tokio::test]
async fn given_soft_deleted_user_when_soft_deleted_again_then_false() {
    // Given
    let pool = create_test_pool().await;
    let repo = LocalUserRepository::new(pool);
    let user = create_test_user("twice@example.com");
    repo.create(&user).await.unwrap();
    repo.soft_delete(user.id, Utc::now()).await.unwrap();

    // When
    let again = repo.soft_delete(user.id, Utc::now()).await.unwrap();

    // Then
    assert_that!(again, eq(false));
}

#[tokio::test]
async fn given_soft_deleted_email_when_recreated_then_new_row_allowed() {
    // Given
    let pool = create_test_pool().await;
    let repo = LocalUserRepository::new(pool);
    let old = create_test_user("reuse@example.com");
    repo.create(&old).await.unwrap();
    repo.soft_delete(old.id, Utc::now()).await.unwrap();

    // When
    let mut new = create_test_user("reuse@example.com");
    new.username = "reuse1".to_string();
    let result = repo.create(&new).await;

    // Then
    assert_that!(result, ok(anything()));
    assert_that!(repo.is_deleted_email("reuse@example.com").await.unwrap(), eq(false));
}

#[tokio::test]
async fn given_duplicate_active_email_when_created_then_unique_violation() {
    // Given
    let pool = create_test_pool().await;
    let repo = LocalUserRepository::new(pool);
    repo.create(&create_test_user("dup@example.com")).await.unwrap();
    let mut second = create_test_user("dup@example.com");
    second.username = "dup2".to_string();

    // When
    let result = repo.create(&second).await;

    // Then
    assert_that!(result.is_err(), eq(true));
    assert_that!(result.unwrap_err().is_unique_violation(), eq(true));
}

#[tokio::test]
async fn given_linked_user_when_found_by_external_id_then_returned() {
    // Given
    let pool = create_test_pool().await;
    let repo = LocalUserRepository::new(pool);
    let user = create_test_user("linked@example.com");
    repo.create(&user).await.unwrap();

    // When
    let linked = repo
        .link_external_id(user.id, "ext-123", true, Utc::now())
        .await
        .unwrap();
    let found = repo.find_active_by_external_id("ext-123").await.unwrap();

    // Then
    assert_that!(linked, eq(true));
    let found = found.unwrap();
    assert_that!(found.id, eq(user.id));
    assert_that!(found.verified, eq(true));
    assert_that!(found.last_synced_at, some(anything()));
}

#[tokio::test]
async fn given_mix_of_users_when_finding_pending_registration_then_only_old_unlinked_unverified() {
    // Given
    let pool = create_test_pool().await;
    let repo = LocalUserRepository::new(pool);
    let now = Utc::now();

    let mut old_pending = create_test_user("old@example.com");
    old_pending.created_at = now - Duration::minutes(10);
    repo.create(&old_pending).await.unwrap();

    let fresh = create_test_user("fresh@example.com");
    repo.create(&fresh).await.unwrap();

    let mut verified = create_test_user("verified@example.com");
    verified.created_at = now - Duration::minutes(10);
    verified.verified = true;
    repo.create(&verified).await.unwrap();

    let mut linked = create_test_user("linked@example.com");
    linked.created_at = now - Duration::minutes(10);
    linked.external_id = Some("ext-1".to_string());
    repo.create(&linked).await.unwrap();

    // When
    let pending = repo
        .find_pending_registration(now - Duration::minutes(5))
        .await
        .unwrap();

    // Then
    assert_that!(pending, len(eq(1)));
    assert_that!(pending[0].email, eq("old@example.com"));
}

#[tokio::test]
async fn given_admin_and_regular_users_when_purged_preserving_admin_then_admin_remains() {
    // Given
    let pool = create_test_pool().await;
    let repo = LocalUserRepository::new(pool);
    let mut admin = create_test_user("admin@example.com");
    admin.is_admin = true;
    repo.create(&admin).await.unwrap();
    repo.create(&create_test_user("a@example.com")).await.unwrap();
    repo.create(&create_test_user("b@example.com")).await.unwrap();

    // When
    let removed = repo.purge(true).await.unwrap();

    // Then
    assert_that!(removed, eq(2));
    assert_that!(repo.count_active().await.unwrap(), eq(1));
}

#[tokio::test]
async fn given_username_taken_when_checked_then_exists() {
    // Given
    let pool = create_test_pool().await;
    let repo = LocalUserRepository::new(pool);
    repo.create(&create_test_user("taken@example.com")).await.unwrap();

    // Then
    assert_that!(repo.username_exists("taken").await.unwrap(), eq(true));
    assert_that!(repo.username_exists("free").await.unwrap(), eq(false));
}

#[tokio::test]
async fn given_user_when_updated_then_fields_persisted() {
    // Given
    let pool = create_test_pool().await;
    let repo = LocalUserRepository::new(pool);
    let mut user = create_test_user("update@example.com");
    repo.create(&user).await.unwrap();

    // When
    user.email = "Renamed@Example.com".to_string();
    user.verified = true;
    user.register_failed_login(Utc::now());
    repo.update(&user).await.unwrap();

    // Then
    let found = repo.find_by_id(user.id).await.unwrap().unwrap();
    assert_that!(found.email, eq("renamed@example.com"));
    assert_that!(found.verified, eq(true));
    assert_that!(found.failed_login_attempts, eq(1));
}

#[tokio::test]
async fn given_user_when_hard_deleted_then_row_gone() {
    // Given
    let pool = create_test_pool().await;
    let repo = LocalUserRepository::new(pool);
    let user = create_test_user("hard@example.com");
    repo.create(&user).await.unwrap();

    // When
    let removed = repo.hard_delete(user.id).await.unwrap();

    // Then
    assert_that!(removed, eq(true));
    assert_that!(repo.find_by_id(user.id).await.unwrap(), none());
    assert_that!(repo.is_deleted_email("hard@example.com").await.unwrap(), eq(false));
}
