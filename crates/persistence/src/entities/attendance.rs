//! Attendance entity (database row mapping).
//!
//! Maps to the `attendance` table. Rows are immutable once inserted.

use chrono::{DateTime, Utc};
use domain::models::attendance::{Attendance, LocationType};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the attendance table.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceEntity {
    pub id: Uuid,
    pub task_id: Uuid,
    pub location_type: String,
    pub photo_url: String,
    pub photo_hash: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_within_geofence: bool,
    pub distance_from_target_m: f64,
    pub recorded_at: DateTime<Utc>,
}

impl AttendanceEntity {
    pub fn into_model(self) -> Result<Attendance, String> {
        let location_type: LocationType = self.location_type.parse()?;
        Ok(Attendance {
            id: self.id,
            task_id: self.task_id,
            location_type,
            photo_url: self.photo_url,
            photo_hash: self.photo_hash,
            latitude: self.latitude,
            longitude: self.longitude,
            is_within_geofence: self.is_within_geofence,
            distance_from_target_m: self.distance_from_target_m,
            recorded_at: self.recorded_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_model_parses_location_type() {
        let entity = AttendanceEntity {
            id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            location_type: "destination".to_string(),
            photo_url: "https://photos.local/xyz.jpg".to_string(),
            photo_hash: "f".repeat(64),
            latitude: 26.1446,
            longitude: 91.7363,
            is_within_geofence: true,
            distance_from_target_m: 14.2,
            recorded_at: Utc::now(),
        };
        let attendance = entity.into_model().unwrap();
        assert_eq!(attendance.location_type, LocationType::Destination);
        assert!(attendance.is_within_geofence);
    }
}
