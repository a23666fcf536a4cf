//! Attendance repository.
//!
//! Same once-only discipline as task events: the `(task_id,
//! location_type)` unique constraint arbitrates concurrent submissions.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::AttendanceEntity;

const ATTENDANCE_COLUMNS: &str = "id, task_id, location_type, photo_url, photo_hash, \
     latitude, longitude, is_within_geofence, distance_from_target_m, recorded_at";

/// Input for inserting an attendance row.
#[derive(Debug, Clone)]
pub struct CreateAttendanceInput {
    pub task_id: Uuid,
    pub location_type: String,
    pub photo_url: String,
    pub photo_hash: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_within_geofence: bool,
    pub distance_from_target_m: f64,
}

/// Repository for attendance check-in operations.
#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts an attendance record with a server-assigned timestamp.
    pub async fn insert(
        &self,
        input: CreateAttendanceInput,
    ) -> Result<AttendanceEntity, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO attendance (id, task_id, location_type, photo_url, photo_hash,
                                    latitude, longitude, is_within_geofence,
                                    distance_from_target_m, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            RETURNING {ATTENDANCE_COLUMNS}
            "#
        );
        sqlx::query_as::<_, AttendanceEntity>(&sql)
            .bind(Uuid::new_v4())
            .bind(input.task_id)
            .bind(&input.location_type)
            .bind(&input.photo_url)
            .bind(&input.photo_hash)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(input.is_within_geofence)
            .bind(input.distance_from_target_m)
            .fetch_one(&self.pool)
            .await
    }

    /// Lists a task's attendance records in recording order.
    pub async fn list_by_task(&self, task_id: Uuid) -> Result<Vec<AttendanceEntity>, sqlx::Error> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE task_id = $1 \
             ORDER BY recorded_at ASC"
        );
        sqlx::query_as::<_, AttendanceEntity>(&sql)
            .bind(task_id)
            .fetch_all(&self.pool)
            .await
    }
}
