use crate::repositories::local_user_repository::{optional_timestamp, timestamp};
use crate::{DbError, Result as DbErrorResult};

use idsync_core::{SyncDirection, SyncFrequency, SyncSchedule};

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

const SCHEDULE_COLUMNS: &str = "id, direction, frequency, is_active, force_update, next_run_at, \
     last_run_at, last_status, locked_at, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ScheduleRow {
    id: String,
    direction: String,
    frequency: String,
    is_active: bool,
    force_update: bool,
    next_run_at: i64,
    last_run_at: Option<i64>,
    last_status: Option<String>,
    locked_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<ScheduleRow> for SyncSchedule {
    type Error = DbError;

    fn try_from(row: ScheduleRow) -> DbErrorResult<Self> {
        Ok(SyncSchedule {
            id: Uuid::parse_str(&row.id).map_err(|e| {
                DbError::invalid_data(format!("sync_schedules.id '{}': {}", row.id, e))
            })?,
            direction: SyncDirection::from_str(&row.direction)
                .map_err(|e| DbError::invalid_data(format!("sync_schedules.direction: {}", e)))?,
            frequency: SyncFrequency::from_str(&row.frequency)
                .map_err(|e| DbError::invalid_data(format!("sync_schedules.frequency: {}", e)))?,
            is_active: row.is_active,
            force_update: row.force_update,
            next_run_at: timestamp(row.next_run_at, "sync_schedules.next_run_at")?,
            last_run_at: optional_timestamp(row.last_run_at, "sync_schedules.last_run_at")?,
            last_status: row.last_status,
            locked_at: optional_timestamp(row.locked_at, "sync_schedules.locked_at")?,
            created_at: timestamp(row.created_at, "sync_schedules.created_at")?,
            updated_at: timestamp(row.updated_at, "sync_schedules.updated_at")?,
        })
    }
}

#[derive(Clone)]
pub struct SyncScheduleRepository {
    pool: SqlitePool,
}

impl SyncScheduleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, schedule: &SyncSchedule) -> DbErrorResult<()> {
        sqlx::query(
            r#"
                INSERT INTO sync_schedules (
                    id, direction, frequency, is_active, force_update, next_run_at,
                    last_run_at, last_status, locked_at, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(schedule.id.to_string())
        .bind(schedule.direction.as_str())
        .bind(schedule.frequency.as_str())
        .bind(schedule.is_active)
        .bind(schedule.force_update)
        .bind(schedule.next_run_at.timestamp())
        .bind(schedule.last_run_at.map(|dt| dt.timestamp()))
        .bind(&schedule.last_status)
        .bind(schedule.locked_at.map(|dt| dt.timestamp()))
        .bind(schedule.created_at.timestamp())
        .bind(schedule.updated_at.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Persist the editable fields; run bookkeeping goes through `record_run`
    pub async fn update(&self, schedule: &SyncSchedule) -> DbErrorResult<bool> {
        let result = sqlx::query(
            r#"
                UPDATE sync_schedules SET
                    direction = ?, frequency = ?, is_active = ?, force_update = ?,
                    next_run_at = ?, updated_at = ?
                WHERE id = ?
            "#,
        )
        .bind(schedule.direction.as_str())
        .bind(schedule.frequency.as_str())
        .bind(schedule.is_active)
        .bind(schedule.force_update)
        .bind(schedule.next_run_at.timestamp())
        .bind(schedule.updated_at.timestamp())
        .bind(schedule.id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_id(&self, id: Uuid) -> DbErrorResult<Option<SyncSchedule>> {
        let sql = format!("SELECT {} FROM sync_schedules WHERE id = ?", SCHEDULE_COLUMNS);
        let row = sqlx::query_as::<_, ScheduleRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(SyncSchedule::try_from).transpose()
    }

    pub async fn list_all(&self) -> DbErrorResult<Vec<SyncSchedule>> {
        let sql = format!(
            "SELECT {} FROM sync_schedules ORDER BY created_at ASC, id ASC",
            SCHEDULE_COLUMNS
        );
        self.fetch(&sql, None).await
    }

    pub async fn list_active(&self) -> DbErrorResult<Vec<SyncSchedule>> {
        let sql = format!(
            "SELECT {} FROM sync_schedules WHERE is_active = 1 ORDER BY next_run_at ASC",
            SCHEDULE_COLUMNS
        );
        self.fetch(&sql, None).await
    }

    /// Active schedules with `next_run_at <= now`
    pub async fn find_due(&self, now: DateTime<Utc>) -> DbErrorResult<Vec<SyncSchedule>> {
        let sql = format!(
            "SELECT {} FROM sync_schedules WHERE is_active = 1 AND next_run_at <= ? \
             ORDER BY next_run_at ASC",
            SCHEDULE_COLUMNS
        );
        self.fetch(&sql, Some(now.timestamp())).await
    }

    async fn fetch(&self, sql: &str, bind: Option<i64>) -> DbErrorResult<Vec<SyncSchedule>> {
        let mut query = sqlx::query_as::<_, ScheduleRow>(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }

        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(SyncSchedule::try_from)
            .collect()
    }

    pub async fn count(&self) -> DbErrorResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sync_schedules")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Take the advisory run lock. A lock taken before `stale_before` is
    /// treated as abandoned and may be taken over.
    pub async fn try_claim(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> DbErrorResult<bool> {
        let result = sqlx::query(
            r#"
                UPDATE sync_schedules SET locked_at = ?
                WHERE id = ? AND (locked_at IS NULL OR locked_at < ?)
            "#,
        )
        .bind(now.timestamp())
        .bind(id.to_string())
        .bind(stale_before.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn release(&self, id: Uuid) -> DbErrorResult<()> {
        sqlx::query("UPDATE sync_schedules SET locked_at = NULL WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Store the outcome of a run and release the lock in one statement
    pub async fn record_run(
        &self,
        id: Uuid,
        ran_at: DateTime<Utc>,
        status: &str,
        next_run_at: DateTime<Utc>,
    ) -> DbErrorResult<()> {
        sqlx::query(
            r#"
                UPDATE sync_schedules SET
                    last_run_at = ?, last_status = ?, next_run_at = ?, locked_at = NULL,
                    updated_at = ?
                WHERE id = ?
            "#,
        )
        .bind(ran_at.timestamp())
        .bind(status)
        .bind(next_run_at.timestamp())
        .bind(ran_at.timestamp())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> DbErrorResult<bool> {
        let result = sqlx::query("DELETE FROM sync_schedules WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
