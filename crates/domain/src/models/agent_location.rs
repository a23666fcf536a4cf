//! Live officer location models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One location ping from an officer's device.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct LocationPing {
    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: f64,

    #[validate(custom(function = "shared::validation::validate_accuracy"))]
    pub accuracy: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_heading"))]
    pub heading: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_speed"))]
    pub speed: Option<f64>,
}

/// The single continuously-overwritten marker row for one officer.
///
/// Last write wins; there is no merge. The row is deleted when the
/// officer's task completes so stale markers drop off the live map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AgentCurrentLocation {
    pub user_id: Uuid,
    pub task_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_validation_accepts_sparse_fields() {
        let ping = LocationPing {
            latitude: 26.1445,
            longitude: 91.7362,
            accuracy: None,
            heading: None,
            speed: None,
        };
        assert!(ping.validate().is_ok());
    }

    #[test]
    fn test_ping_validation_rejects_bad_heading() {
        let ping = LocationPing {
            latitude: 26.1445,
            longitude: 91.7362,
            accuracy: Some(5.0),
            heading: Some(400.0),
            speed: Some(1.5),
        };
        assert!(ping.validate().is_err());
    }
}
