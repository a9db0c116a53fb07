use sqlx::SqlitePool;

/// In-memory SQLite pool with migrations applied
pub async fn create_test_pool() -> SqlitePool {
    idsync_db::connect_in_memory()
        .await
        .expect("Failed to create test pool")
}
