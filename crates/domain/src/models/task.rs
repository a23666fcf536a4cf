//! Sealed-carton delivery task domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::services::pack_code::validate_pack_code;

/// Lifecycle status of a delivery task.
///
/// Tasks are never deleted, only transitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Suspicious,
}

impl TaskStatus {
    /// Whether the task still accepts checkpoint events and location pings.
    pub fn is_active(self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::InProgress)
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "suspicious" => Ok(TaskStatus::Suspicious),
            _ => Err(format!("Unknown task status: {}", s)),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Suspicious => write!(f, "suspicious"),
        }
    }
}

/// One sealed-carton delivery assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Task {
    pub id: Uuid,
    pub pack_code: String,
    pub exam_type: String,
    pub source_address: String,
    pub destination_address: String,
    pub source_latitude: Option<f64>,
    pub source_longitude: Option<f64>,
    pub destination_latitude: Option<f64>,
    pub destination_longitude: Option<f64>,
    /// Geofence radius around the checkpoint targets, in meters.
    pub geofence_radius_m: f64,
    pub assigned_user_id: Uuid,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a task (admin only).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateTaskRequest {
    #[validate(custom(function = "validate_pack_code"))]
    pub pack_code: String,

    #[validate(length(min = 1, max = 100, message = "Exam type must be 1-100 characters"))]
    pub exam_type: String,

    #[validate(length(min = 1, max = 500, message = "Source address must be 1-500 characters"))]
    pub source_address: String,

    #[validate(length(
        min = 1,
        max = 500,
        message = "Destination address must be 1-500 characters"
    ))]
    pub destination_address: String,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub source_latitude: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub source_longitude: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub destination_latitude: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub destination_longitude: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_geofence_radius"))]
    pub geofence_radius_m: f64,

    pub assigned_user_id: Uuid,

    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

impl CreateTaskRequest {
    /// Window ordering cannot be expressed as a field-level validator.
    pub fn validate_window(&self) -> Result<(), String> {
        if self.window_end <= self.window_start {
            return Err("Task window end must be after window start".to_string());
        }
        Ok(())
    }
}

/// Request payload for an admin status transition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateTaskStatusRequest {
    pub status: TaskStatus,
}

/// Query parameters for listing tasks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListTasksQuery {
    pub status: Option<TaskStatus>,
    pub assigned_user_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Response payload for task listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListTasksResponse {
    pub tasks: Vec<Task>,
    /// Whether more tasks exist beyond this page.
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn valid_request() -> CreateTaskRequest {
        CreateTaskRequest {
            pack_code: "PK-2024HSLC01".to_string(),
            exam_type: "HSLC".to_string(),
            source_address: "Panbazar Police Station".to_string(),
            destination_address: "Cotton Collegiate HS".to_string(),
            source_latitude: Some(26.1871),
            source_longitude: Some(91.7448),
            destination_latitude: Some(26.1445),
            destination_longitude: Some(91.7362),
            geofence_radius_m: 100.0,
            assigned_user_id: Uuid::new_v4(),
            window_start: Utc::now(),
            window_end: Utc::now() + Duration::hours(6),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        let req = valid_request();
        assert!(req.validate().is_ok());
        assert!(req.validate_window().is_ok());
    }

    #[test]
    fn test_bad_pack_code_rejected() {
        let mut req = valid_request();
        req.pack_code = "pack-1".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let mut req = valid_request();
        req.destination_latitude = Some(123.0);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_inverted_window_rejected() {
        let mut req = valid_request();
        req.window_end = req.window_start - Duration::minutes(1);
        assert!(req.validate_window().is_err());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Suspicious,
        ] {
            assert_eq!(status.to_string().parse::<TaskStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_is_active() {
        assert!(TaskStatus::Pending.is_active());
        assert!(TaskStatus::InProgress.is_active());
        assert!(!TaskStatus::Completed.is_active());
        assert!(!TaskStatus::Suspicious.is_active());
    }
}
