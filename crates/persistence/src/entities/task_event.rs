//! Task event entity (database row mapping).
//!
//! Maps to the `task_events` table. Rows are immutable once inserted.

use chrono::{DateTime, Utc};
use domain::models::task_event::{EventType, TaskEvent};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the task_events table.
#[derive(Debug, Clone, FromRow)]
pub struct TaskEventEntity {
    pub id: Uuid,
    pub task_id: Uuid,
    pub event_type: String,
    pub photo_url: String,
    pub photo_hash: String,
    pub latitude: f64,
    pub longitude: f64,
    pub recorded_at: DateTime<Utc>,
}

impl TaskEventEntity {
    pub fn into_model(self) -> Result<TaskEvent, String> {
        let event_type: EventType = self.event_type.parse()?;
        Ok(TaskEvent {
            id: self.id,
            task_id: self.task_id,
            event_type,
            photo_url: self.photo_url,
            photo_hash: self.photo_hash,
            latitude: self.latitude,
            longitude: self.longitude,
            recorded_at: self.recorded_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_model_parses_event_type() {
        let entity = TaskEventEntity {
            id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            event_type: "opening_seal".to_string(),
            photo_url: "https://photos.local/abc.jpg".to_string(),
            photo_hash: "0".repeat(64),
            latitude: 26.1445,
            longitude: 91.7362,
            recorded_at: Utc::now(),
        };
        let event = entity.into_model().unwrap();
        assert_eq!(event.event_type, EventType::OpeningSeal);
    }
}
