//! Task assignment validation.
//!
//! Every checkpoint submission and location ping passes through this
//! check before anything is persisted. Rejections for a wrong assignee
//! are security-relevant and must be audit-logged by the caller.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::task::{Task, TaskStatus};

/// Pings inside the final stretch of the task window are additionally
/// written to the append-only history table.
pub const HISTORY_TAIL_MINUTES: i64 = 15;

/// Why an update against a task was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentError {
    #[error("You are not assigned to this task")]
    NotAssigned,

    #[error("Task is {0} and no longer accepts updates")]
    InvalidState(TaskStatus),

    #[error("Task window has not started yet")]
    TooEarly,
}

/// Successful validation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentOk {
    /// Whether this update falls within the last [`HISTORY_TAIL_MINUTES`]
    /// of the task window and should also be written to history.
    pub store_history: bool,
}

/// Validates that `officer_id` may record an update against `task` at `now`.
///
/// Checks, in order: assignee match, active status, window start. Task
/// existence is the caller's concern (repository lookup happens first).
pub fn validate_assignment(
    task: &Task,
    officer_id: Uuid,
    now: DateTime<Utc>,
) -> Result<AssignmentOk, AssignmentError> {
    if task.assigned_user_id != officer_id {
        return Err(AssignmentError::NotAssigned);
    }

    if !task.status.is_active() {
        return Err(AssignmentError::InvalidState(task.status));
    }

    if now < task.window_start {
        return Err(AssignmentError::TooEarly);
    }

    let history_tail_start = task.window_end - Duration::minutes(HISTORY_TAIL_MINUTES);
    Ok(AssignmentOk {
        store_history: now >= history_tail_start,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_for(officer: Uuid, status: TaskStatus, now: DateTime<Utc>) -> Task {
        Task {
            id: Uuid::new_v4(),
            pack_code: "PK-TEST01".to_string(),
            exam_type: "HSLC".to_string(),
            source_address: "src".to_string(),
            destination_address: "dst".to_string(),
            source_latitude: None,
            source_longitude: None,
            destination_latitude: Some(26.1445),
            destination_longitude: Some(91.7362),
            geofence_radius_m: 100.0,
            assigned_user_id: officer,
            window_start: now - Duration::hours(1),
            window_end: now + Duration::hours(1),
            status,
            created_at: now - Duration::hours(2),
            updated_at: now - Duration::hours(2),
        }
    }

    #[test]
    fn test_wrong_officer_rejected() {
        let now = Utc::now();
        let task = task_for(Uuid::new_v4(), TaskStatus::InProgress, now);
        let result = validate_assignment(&task, Uuid::new_v4(), now);
        assert_eq!(result, Err(AssignmentError::NotAssigned));
    }

    #[test]
    fn test_completed_task_rejected() {
        let now = Utc::now();
        let officer = Uuid::new_v4();
        let task = task_for(officer, TaskStatus::Completed, now);
        assert_eq!(
            validate_assignment(&task, officer, now),
            Err(AssignmentError::InvalidState(TaskStatus::Completed))
        );
    }

    #[test]
    fn test_suspicious_task_rejected() {
        let now = Utc::now();
        let officer = Uuid::new_v4();
        let task = task_for(officer, TaskStatus::Suspicious, now);
        assert!(matches!(
            validate_assignment(&task, officer, now),
            Err(AssignmentError::InvalidState(TaskStatus::Suspicious))
        ));
    }

    #[test]
    fn test_before_window_rejected() {
        let now = Utc::now();
        let officer = Uuid::new_v4();
        let mut task = task_for(officer, TaskStatus::Pending, now);
        task.window_start = now + Duration::minutes(30);
        assert_eq!(
            validate_assignment(&task, officer, now),
            Err(AssignmentError::TooEarly)
        );
    }

    #[test]
    fn test_mid_window_does_not_store_history() {
        let now = Utc::now();
        let officer = Uuid::new_v4();
        let task = task_for(officer, TaskStatus::InProgress, now);
        // window_end is one hour out, well beyond the 15-minute tail
        let ok = validate_assignment(&task, officer, now).unwrap();
        assert!(!ok.store_history);
    }

    #[test]
    fn test_window_tail_stores_history() {
        let now = Utc::now();
        let officer = Uuid::new_v4();
        let mut task = task_for(officer, TaskStatus::InProgress, now);
        task.window_end = now + Duration::minutes(10);
        let ok = validate_assignment(&task, officer, now).unwrap();
        assert!(ok.store_history);
    }

    #[test]
    fn test_pending_task_accepts_updates() {
        let now = Utc::now();
        let officer = Uuid::new_v4();
        let task = task_for(officer, TaskStatus::Pending, now);
        assert!(validate_assignment(&task, officer, now).is_ok());
    }
}
