//! Task repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::TaskEntity;

const TASK_COLUMNS: &str = "id, pack_code, exam_type, source_address, destination_address, \
     source_latitude, source_longitude, destination_latitude, destination_longitude, \
     geofence_radius_m, assigned_user_id, window_start, window_end, status, \
     created_at, updated_at";

/// Input for creating a task row.
#[derive(Debug, Clone)]
pub struct CreateTaskInput {
    pub pack_code: String,
    pub exam_type: String,
    pub source_address: String,
    pub destination_address: String,
    pub source_latitude: Option<f64>,
    pub source_longitude: Option<f64>,
    pub destination_latitude: Option<f64>,
    pub destination_longitude: Option<f64>,
    pub geofence_radius_m: f64,
    pub assigned_user_id: Uuid,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

/// Filters for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskListFilter {
    pub status: Option<String>,
    pub assigned_user_id: Option<Uuid>,
    pub limit: i64,
    pub offset: i64,
}

/// Repository for task-related database operations.
#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    /// Creates a new TaskRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new task in `pending` status.
    ///
    /// A duplicate pack code surfaces as a unique violation (SQLSTATE
    /// 23505) which the API layer maps to Conflict.
    pub async fn create(&self, input: CreateTaskInput) -> Result<TaskEntity, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO tasks (id, pack_code, exam_type, source_address, destination_address,
                               source_latitude, source_longitude,
                               destination_latitude, destination_longitude,
                               geofence_radius_m, assigned_user_id, window_start, window_end)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {TASK_COLUMNS}
            "#
        );
        sqlx::query_as::<_, TaskEntity>(&sql)
            .bind(Uuid::new_v4())
            .bind(&input.pack_code)
            .bind(&input.exam_type)
            .bind(&input.source_address)
            .bind(&input.destination_address)
            .bind(input.source_latitude)
            .bind(input.source_longitude)
            .bind(input.destination_latitude)
            .bind(input.destination_longitude)
            .bind(input.geofence_radius_m)
            .bind(input.assigned_user_id)
            .bind(input.window_start)
            .bind(input.window_end)
            .fetch_one(&self.pool)
            .await
    }

    /// Finds a task by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TaskEntity>, sqlx::Error> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, TaskEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Lists tasks, newest first, with optional status/assignee filters.
    pub async fn list(&self, filter: TaskListFilter) -> Result<Vec<TaskEntity>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param = 0;

        if filter.status.is_some() {
            param += 1;
            conditions.push(format!("status = ${param}"));
        }
        if filter.assigned_user_id.is_some() {
            param += 1;
            conditions.push(format!("assigned_user_id = ${param}"));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks {where_clause} \
             ORDER BY created_at DESC, id DESC LIMIT ${} OFFSET ${}",
            param + 1,
            param + 2
        );

        let mut query = sqlx::query_as::<_, TaskEntity>(&sql);
        if let Some(ref status) = filter.status {
            query = query.bind(status);
        }
        if let Some(user_id) = filter.assigned_user_id {
            query = query.bind(user_id);
        }
        query
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await
    }

    /// Sets a task's status unconditionally (admin transition).
    pub async fn update_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<Option<TaskEntity>, sqlx::Error> {
        let sql = format!(
            "UPDATE tasks SET status = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {TASK_COLUMNS}"
        );
        sqlx::query_as::<_, TaskEntity>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await
    }

    /// Moves a pending task to in_progress. No-op if the task already
    /// advanced; the WHERE clause makes the transition race-safe.
    pub async fn mark_in_progress_if_pending(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE tasks SET status = 'in_progress', updated_at = NOW() \
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
