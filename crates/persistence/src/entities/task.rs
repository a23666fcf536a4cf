//! Task entity (database row mapping).
//!
//! Maps to the `tasks` table.

use chrono::{DateTime, Utc};
use domain::models::task::{Task, TaskStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the tasks table.
#[derive(Debug, Clone, FromRow)]
pub struct TaskEntity {
    pub id: Uuid,
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
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskEntity {
    /// Converts the row into the domain model, parsing the status enum.
    pub fn into_model(self) -> Result<Task, String> {
        let status: TaskStatus = self.status.parse()?;
        Ok(Task {
            id: self.id,
            pack_code: self.pack_code,
            exam_type: self.exam_type,
            source_address: self.source_address,
            destination_address: self.destination_address,
            source_latitude: self.source_latitude,
            source_longitude: self.source_longitude,
            destination_latitude: self.destination_latitude,
            destination_longitude: self.destination_longitude,
            geofence_radius_m: self.geofence_radius_m,
            assigned_user_id: self.assigned_user_id,
            window_start: self.window_start,
            window_end: self.window_end,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity_with_status(status: &str) -> TaskEntity {
        TaskEntity {
            id: Uuid::new_v4(),
            pack_code: "PK-2024HSLC01".to_string(),
            exam_type: "HSLC".to_string(),
            source_address: "src".to_string(),
            destination_address: "dst".to_string(),
            source_latitude: None,
            source_longitude: None,
            destination_latitude: Some(26.1445),
            destination_longitude: Some(91.7362),
            geofence_radius_m: 100.0,
            assigned_user_id: Uuid::new_v4(),
            window_start: Utc::now(),
            window_end: Utc::now(),
            status: status.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_into_model_parses_status() {
        let task = entity_with_status("in_progress").into_model().unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    #[test]
    fn test_into_model_rejects_unknown_status() {
        assert!(entity_with_status("vanished").into_model().is_err());
    }
}
