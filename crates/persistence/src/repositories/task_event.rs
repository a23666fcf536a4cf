//! Task event repository.
//!
//! Inserts rely on the `(task_id, event_type)` unique constraint for
//! once-only semantics; there is deliberately no check-then-insert. The
//! table has no UPDATE or DELETE path.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::TaskEventEntity;

const EVENT_COLUMNS: &str =
    "id, task_id, event_type, photo_url, photo_hash, latitude, longitude, recorded_at";

/// Repository for checkpoint event operations.
#[derive(Clone)]
pub struct TaskEventRepository {
    pool: PgPool,
}

impl TaskEventRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a checkpoint event with a server-assigned timestamp.
    ///
    /// A second insert for the same (task, event type) fails with
    /// SQLSTATE 23505, surfaced by the API layer as Conflict.
    pub async fn insert(
        &self,
        task_id: Uuid,
        event_type: &str,
        photo_url: &str,
        photo_hash: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<TaskEventEntity, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO task_events (id, task_id, event_type, photo_url, photo_hash,
                                     latitude, longitude, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING {EVENT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, TaskEventEntity>(&sql)
            .bind(Uuid::new_v4())
            .bind(task_id)
            .bind(event_type)
            .bind(photo_url)
            .bind(photo_hash)
            .bind(latitude)
            .bind(longitude)
            .fetch_one(&self.pool)
            .await
    }

    /// Lists a task's events in recording order.
    pub async fn list_by_task(&self, task_id: Uuid) -> Result<Vec<TaskEventEntity>, sqlx::Error> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM task_events WHERE task_id = $1 ORDER BY recorded_at ASC"
        );
        sqlx::query_as::<_, TaskEventEntity>(&sql)
            .bind(task_id)
            .fetch_all(&self.pool)
            .await
    }
}
