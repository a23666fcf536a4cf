//! Checkpoint event domain model.
//!
//! One event per checkpoint in the five-step custody chain. Events are
//! immutable once created; there is no update or delete path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// The five fixed checkpoints of the paper-carton custody chain.
///
/// At most one event of each type exists per task. No ordering is
/// enforced across types; uniqueness per type is the only constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    PickupAtPoliceStation,
    ArrivalAtExamCenter,
    OpeningSeal,
    SealingAnswerSheets,
    SubmissionAtPostOffice,
}

impl EventType {
    /// The final checkpoint; recording it completes the task.
    pub fn is_terminal(self) -> bool {
        matches!(self, EventType::SubmissionAtPostOffice)
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pickup_at_police_station" => Ok(EventType::PickupAtPoliceStation),
            "arrival_at_exam_center" => Ok(EventType::ArrivalAtExamCenter),
            "opening_seal" => Ok(EventType::OpeningSeal),
            "sealing_answer_sheets" => Ok(EventType::SealingAnswerSheets),
            "submission_at_post_office" => Ok(EventType::SubmissionAtPostOffice),
            _ => Err(format!("Unknown event type: {}", s)),
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::PickupAtPoliceStation => write!(f, "pickup_at_police_station"),
            EventType::ArrivalAtExamCenter => write!(f, "arrival_at_exam_center"),
            EventType::OpeningSeal => write!(f, "opening_seal"),
            EventType::SealingAnswerSheets => write!(f, "sealing_answer_sheets"),
            EventType::SubmissionAtPostOffice => write!(f, "submission_at_post_office"),
        }
    }
}

/// One recorded checkpoint event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TaskEvent {
    pub id: Uuid,
    pub task_id: Uuid,
    pub event_type: EventType,
    pub photo_url: String,
    /// SHA-256 hex of the submitted photo bytes.
    pub photo_hash: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Server-assigned; client timestamps are never trusted.
    pub recorded_at: DateTime<Utc>,
}

/// Form fields accompanying the multipart photo upload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct EventSubmission {
    pub event_type: EventType,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: f64,
}

/// Response payload for a recorded event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RecordEventResponse {
    pub success: bool,
    pub message: String,
    pub event: TaskEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_round_trip() {
        for event_type in [
            EventType::PickupAtPoliceStation,
            EventType::ArrivalAtExamCenter,
            EventType::OpeningSeal,
            EventType::SealingAnswerSheets,
            EventType::SubmissionAtPostOffice,
        ] {
            assert_eq!(
                event_type.to_string().parse::<EventType>().unwrap(),
                event_type
            );
        }
    }

    #[test]
    fn test_unknown_event_type_rejected() {
        assert!("teleport_to_moon".parse::<EventType>().is_err());
    }

    #[test]
    fn test_only_submission_is_terminal() {
        assert!(EventType::SubmissionAtPostOffice.is_terminal());
        assert!(!EventType::PickupAtPoliceStation.is_terminal());
        assert!(!EventType::OpeningSeal.is_terminal());
    }

    #[test]
    fn test_submission_coordinate_validation() {
        let good = EventSubmission {
            event_type: EventType::OpeningSeal,
            latitude: 26.1445,
            longitude: 91.7362,
        };
        assert!(good.validate().is_ok());

        let bad = EventSubmission {
            event_type: EventType::OpeningSeal,
            latitude: -95.0,
            longitude: 91.7362,
        };
        assert!(bad.validate().is_err());
    }
}
