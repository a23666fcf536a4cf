//! Geo-checked attendance domain model.
//!
//! Attendance mirrors checkpoint events but additionally carries the
//! geofence verdict. The verdict is advisory: submissions outside the
//! fence are still persisted, only flagged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Which task endpoint the check-in is made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Pickup,
    Destination,
}

impl FromStr for LocationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pickup" => Ok(LocationType::Pickup),
            "destination" => Ok(LocationType::Destination),
            _ => Err(format!("Unknown location type: {}", s)),
        }
    }
}

impl std::fmt::Display for LocationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationType::Pickup => write!(f, "pickup"),
            LocationType::Destination => write!(f, "destination"),
        }
    }
}

/// One recorded attendance check-in. Unique per (task, location type).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Attendance {
    pub id: Uuid,
    pub task_id: Uuid,
    pub location_type: LocationType,
    pub photo_url: String,
    pub photo_hash: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_within_geofence: bool,
    /// Haversine distance to the task's target coordinates, in meters.
    pub distance_from_target_m: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Form fields accompanying the multipart photo upload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct AttendanceSubmission {
    pub location_type: LocationType,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: f64,
}

/// Response payload for a recorded attendance check-in.
///
/// `success` means the submission was accepted and logged, not that it
/// was within the geofence.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MarkAttendanceResponse {
    pub success: bool,
    pub message: String,
    pub attendance: Attendance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_type_round_trip() {
        for lt in [LocationType::Pickup, LocationType::Destination] {
            assert_eq!(lt.to_string().parse::<LocationType>().unwrap(), lt);
        }
    }

    #[test]
    fn test_unknown_location_type_rejected() {
        assert!("warehouse".parse::<LocationType>().is_err());
    }

    #[test]
    fn test_submission_coordinate_validation() {
        let bad = AttendanceSubmission {
            location_type: LocationType::Destination,
            latitude: 26.1445,
            longitude: 181.0,
        };
        assert!(bad.validate().is_err());
    }
}
