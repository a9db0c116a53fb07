//! Local user store.
//!
//! Emails are case-folded before every query and write. "Active" means
//! `deleted_at IS NULL`; soft-deleted rows stay in the table but are invisible
//! to every `*_active` query and to active counts.

use crate::{DbError, Result as DbErrorResult};

use idsync_core::{LocalUser, normalize_email};

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, username, external_id, verified, is_admin, credential, \
     failed_login_attempts, locked_until, deleted_at, last_synced_at, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    username: String,
    external_id: Option<String>,
    verified: bool,
    is_admin: bool,
    credential: Option<String>,
    failed_login_attempts: i64,
    locked_until: Option<i64>,
    deleted_at: Option<i64>,
    last_synced_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<UserRow> for LocalUser {
    type Error = DbError;

    fn try_from(row: UserRow) -> DbErrorResult<Self> {
        Ok(LocalUser {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| DbError::invalid_data(format!("users.id '{}': {}", row.id, e)))?,
            email: row.email,
            username: row.username,
            external_id: row.external_id,
            verified: row.verified,
            is_admin: row.is_admin,
            credential: row.credential,
            failed_login_attempts: row.failed_login_attempts as i32,
            locked_until: optional_timestamp(row.locked_until, "users.locked_until")?,
            deleted_at: optional_timestamp(row.deleted_at, "users.deleted_at")?,
            last_synced_at: optional_timestamp(row.last_synced_at, "users.last_synced_at")?,
            created_at: timestamp(row.created_at, "users.created_at")?,
            updated_at: timestamp(row.updated_at, "users.updated_at")?,
        })
    }
}

pub(crate) fn timestamp(secs: i64, column: &str) -> DbErrorResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| DbError::invalid_data(format!("Invalid timestamp in {}", column)))
}

pub(crate) fn optional_timestamp(
    secs: Option<i64>,
    column: &str,
) -> DbErrorResult<Option<DateTime<Utc>>> {
    secs.map(|s| timestamp(s, column)).transpose()
}

#[derive(Clone)]
pub struct LocalUserRepository {
    pool: SqlitePool,
}

impl LocalUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user: &LocalUser) -> DbErrorResult<()> {
        sqlx::query(
            r#"
                INSERT INTO users (
                    id, email, username, external_id, verified, is_admin, credential,
                    failed_login_attempts, locked_until, deleted_at, last_synced_at,
                    created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(normalize_email(&user.email))
        .bind(&user.username)
        .bind(&user.external_id)
        .bind(user.verified)
        .bind(user.is_admin)
        .bind(&user.credential)
        .bind(user.failed_login_attempts as i64)
        .bind(user.locked_until.map(|dt| dt.timestamp()))
        .bind(user.deleted_at.map(|dt| dt.timestamp()))
        .bind(user.last_synced_at.map(|dt| dt.timestamp()))
        .bind(user.created_at.timestamp())
        .bind(user.updated_at.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Persist every mutable field of an existing row
    pub async fn update(&self, user: &LocalUser) -> DbErrorResult<()> {
        sqlx::query(
            r#"
                UPDATE users SET
                    email = ?, username = ?, external_id = ?, verified = ?, is_admin = ?,
                    credential = ?, failed_login_attempts = ?, locked_until = ?,
                    last_synced_at = ?, updated_at = ?
                WHERE id = ?
            "#,
        )
        .bind(normalize_email(&user.email))
        .bind(&user.username)
        .bind(&user.external_id)
        .bind(user.verified)
        .bind(user.is_admin)
        .bind(&user.credential)
        .bind(user.failed_login_attempts as i64)
        .bind(user.locked_until.map(|dt| dt.timestamp()))
        .bind(user.last_synced_at.map(|dt| dt.timestamp()))
        .bind(user.updated_at.timestamp())
        .bind(user.id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> DbErrorResult<Option<LocalUser>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(LocalUser::try_from).transpose()
    }

    pub async fn find_active_by_email(&self, email: &str) -> DbErrorResult<Option<LocalUser>> {
        let sql = format!(
            "SELECT {} FROM users WHERE email = ? AND deleted_at IS NULL",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;

        row.map(LocalUser::try_from).transpose()
    }

    pub async fn find_active_by_external_id(
        &self,
        external_id: &str,
    ) -> DbErrorResult<Option<LocalUser>> {
        let sql = format!(
            "SELECT {} FROM users WHERE external_id = ? AND deleted_at IS NULL",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(LocalUser::try_from).transpose()
    }

    /// True when the only rows for this email are soft-deleted ones
    pub async fn is_deleted_email(&self, email: &str) -> DbErrorResult<bool> {
        let (deleted, active): (i64, i64) = sqlx::query_as(
            r#"
                SELECT
                    COALESCE(SUM(CASE WHEN deleted_at IS NOT NULL THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN deleted_at IS NULL THEN 1 ELSE 0 END), 0)
                FROM users WHERE email = ?
            "#,
        )
        .bind(normalize_email(email))
        .fetch_one(&self.pool)
        .await?;

        Ok(deleted > 0 && active == 0)
    }

    /// Active users ordered by creation, optionally restricted to one email
    pub async fn list_active(&self, email_filter: Option<&str>) -> DbErrorResult<Vec<LocalUser>> {
        self.list(email_filter, false).await
    }

    /// Every row, soft-deleted ones included
    pub async fn list_all(&self, email_filter: Option<&str>) -> DbErrorResult<Vec<LocalUser>> {
        self.list(email_filter, true).await
    }

    async fn list(
        &self,
        email_filter: Option<&str>,
        include_deleted: bool,
    ) -> DbErrorResult<Vec<LocalUser>> {
        let mut sql = format!("SELECT {} FROM users WHERE 1 = 1", USER_COLUMNS);
        if !include_deleted {
            sql.push_str(" AND deleted_at IS NULL");
        }
        if email_filter.is_some() {
            sql.push_str(" AND email = ?");
        }
        sql.push_str(" ORDER BY created_at ASC, id ASC");

        let mut query = sqlx::query_as::<_, UserRow>(&sql);
        if let Some(email) = email_filter {
            query = query.bind(normalize_email(email));
        }

        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(LocalUser::try_from)
            .collect()
    }

    pub async fn count_active(&self) -> DbErrorResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Usernames are unique across all rows, deleted ones included
    pub async fn username_exists(&self, username: &str) -> DbErrorResult<bool> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    /// Unlinked, unverified, active accounts created before `created_before`
    pub async fn find_pending_registration(
        &self,
        created_before: DateTime<Utc>,
    ) -> DbErrorResult<Vec<LocalUser>> {
        let sql = format!(
            r#"
                SELECT {} FROM users
                WHERE external_id IS NULL AND verified = 0 AND deleted_at IS NULL
                  AND created_at < ?
                ORDER BY created_at ASC
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, UserRow>(&sql)
            .bind(created_before.timestamp())
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(LocalUser::try_from)
            .collect()
    }

    pub async fn link_external_id(
        &self,
        id: Uuid,
        external_id: &str,
        verified: bool,
        now: DateTime<Utc>,
    ) -> DbErrorResult<bool> {
        let result = sqlx::query(
            r#"
                UPDATE users
                SET external_id = ?, verified = (verified OR ?), last_synced_at = ?, updated_at = ?
                WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(external_id)
        .bind(verified)
        .bind(now.timestamp())
        .bind(now.timestamp())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns false when the row was already gone or already soft-deleted
    pub async fn soft_delete(&self, id: Uuid, now: DateTime<Utc>) -> DbErrorResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(now.timestamp())
        .bind(now.timestamp())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn hard_delete(&self, id: Uuid) -> DbErrorResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove every row (or every non-admin row). Returns rows removed.
    pub async fn purge(&self, preserve_admin: bool) -> DbErrorResult<u64> {
        let sql = if preserve_admin {
            "DELETE FROM users WHERE is_admin = 0"
        } else {
            "DELETE FROM users"
        };

        let result = sqlx::query(sql).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
