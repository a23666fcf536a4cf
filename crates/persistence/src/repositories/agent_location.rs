//! Agent location repository.
//!
//! The current-location table holds exactly one row per officer with
//! create-or-overwrite semantics (last write wins, no conflict error).
//! History rows are append-only.

use domain::models::agent_location::LocationPing;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{AgentCurrentLocationEntity, AgentLocationHistoryEntity};

const CURRENT_COLUMNS: &str =
    "user_id, task_id, latitude, longitude, accuracy, heading, speed, updated_at";

const HISTORY_COLUMNS: &str =
    "id, user_id, task_id, latitude, longitude, accuracy, heading, speed, recorded_at";

/// Repository for live officer location operations.
#[derive(Clone)]
pub struct AgentLocationRepository {
    pool: PgPool,
}

impl AgentLocationRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts the officer's single marker row. Last write wins.
    pub async fn upsert(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        ping: &LocationPing,
    ) -> Result<AgentCurrentLocationEntity, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO agent_current_locations
                (user_id, task_id, latitude, longitude, accuracy, heading, speed, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            ON CONFLICT (user_id) DO UPDATE SET
                task_id = EXCLUDED.task_id,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                accuracy = EXCLUDED.accuracy,
                heading = EXCLUDED.heading,
                speed = EXCLUDED.speed,
                updated_at = NOW()
            RETURNING {CURRENT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, AgentCurrentLocationEntity>(&sql)
            .bind(user_id)
            .bind(task_id)
            .bind(ping.latitude)
            .bind(ping.longitude)
            .bind(ping.accuracy)
            .bind(ping.heading)
            .bind(ping.speed)
            .fetch_one(&self.pool)
            .await
    }

    /// Appends a ping to the immutable history log.
    pub async fn append_history(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        ping: &LocationPing,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO agent_location_history
                (user_id, task_id, latitude, longitude, accuracy, heading, speed, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            "#,
        )
        .bind(user_id)
        .bind(task_id)
        .bind(ping.latitude)
        .bind(ping.longitude)
        .bind(ping.accuracy)
        .bind(ping.heading)
        .bind(ping.speed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Finds the current marker for a task, if any officer is reporting on it.
    pub async fn find_by_task(
        &self,
        task_id: Uuid,
    ) -> Result<Option<AgentCurrentLocationEntity>, sqlx::Error> {
        let sql = format!(
            "SELECT {CURRENT_COLUMNS} FROM agent_current_locations WHERE task_id = $1 \
             ORDER BY updated_at DESC LIMIT 1"
        );
        sqlx::query_as::<_, AgentCurrentLocationEntity>(&sql)
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Deletes the officer's marker row. Best-effort: a missing row is
    /// not an error, so the returned count may be zero.
    pub async fn clear(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM agent_current_locations WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Pages a task's history log for audit replay, oldest first.
    ///
    /// `after` is an exclusive (recorded_at, id) cursor position.
    pub async fn history_for_task(
        &self,
        task_id: Uuid,
        after: Option<(chrono::DateTime<chrono::Utc>, i64)>,
        limit: i64,
    ) -> Result<Vec<AgentLocationHistoryEntity>, sqlx::Error> {
        match after {
            Some((ts, id)) => {
                let sql = format!(
                    "SELECT {HISTORY_COLUMNS} FROM agent_location_history \
                     WHERE task_id = $1 AND (recorded_at, id) > ($2, $3) \
                     ORDER BY recorded_at ASC, id ASC LIMIT $4"
                );
                sqlx::query_as::<_, AgentLocationHistoryEntity>(&sql)
                    .bind(task_id)
                    .bind(ts)
                    .bind(id)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!(
                    "SELECT {HISTORY_COLUMNS} FROM agent_location_history \
                     WHERE task_id = $1 ORDER BY recorded_at ASC, id ASC LIMIT $2"
                );
                sqlx::query_as::<_, AgentLocationHistoryEntity>(&sql)
                    .bind(task_id)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
        }
    }
}
