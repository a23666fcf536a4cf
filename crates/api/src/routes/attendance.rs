//! Geo-checked attendance route handlers.
//!
//! The geofence verdict is advisory: out-of-fence check-ins are stored
//! and flagged, never rejected. Only the `(task_id, location_type)`
//! unique constraint can refuse a submission.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use domain::models::attendance::{
    Attendance, AttendanceSubmission, LocationType, MarkAttendanceResponse,
};
use domain::models::audit_log::AuditAction;
use domain::models::task::Task;
use domain::services::assignment::{validate_assignment, AssignmentError};
use domain::services::audit::AuditLogBuilder;
use domain::services::geofence::evaluate_geofence;
use persistence::repositories::{AttendanceRepository, CreateAttendanceInput, TaskRepository};
use shared::crypto::sha256_hex;
use shared::geo::GeoPoint;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_attendance_marked;
use crate::middleware::trace_id::RequestId;
use crate::routes::{audit_assignment_denied, read_photo_upload};
use crate::services::audit;

/// POST /api/v1/tasks/:task_id/attendance
///
/// Multipart submission: `location_type`, `latitude`, `longitude` text
/// fields plus the `image` part.
pub async fn mark_attendance(
    State(state): State<AppState>,
    auth: UserAuth,
    Extension(request_id): Extension<RequestId>,
    Path(task_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<MarkAttendanceResponse>), ApiError> {
    let upload = read_photo_upload(multipart).await?;

    let submission = AttendanceSubmission {
        location_type: upload.parse_field("location_type")?,
        latitude: upload.parse_field("latitude")?,
        longitude: upload.parse_field("longitude")?,
    };
    submission.validate()?;

    let task_repo = TaskRepository::new(state.pool.clone());
    let task = task_repo
        .find_by_id(task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?
        .into_model()
        .map_err(ApiError::Internal)?;

    if let Err(e) = validate_assignment(&task, auth.user_id, Utc::now()) {
        if matches!(e, AssignmentError::NotAssigned) {
            audit_assignment_denied(&state, &auth, task_id, &request_id, "attendance check-in");
        }
        return Err(e.into());
    }

    let target = target_point(&task, submission.location_type)?;
    let actual = GeoPoint::new(submission.latitude, submission.longitude);
    let check = evaluate_geofence(target, actual, task.geofence_radius_m);

    let photo_hash = sha256_hex(&upload.photo);
    let photo_url = state
        .storage
        .store("attendance", &photo_hash, &upload.photo)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let repo = AttendanceRepository::new(state.pool.clone());
    let attendance = repo
        .insert(CreateAttendanceInput {
            task_id,
            location_type: submission.location_type.to_string(),
            photo_url,
            photo_hash,
            latitude: submission.latitude,
            longitude: submission.longitude,
            is_within_geofence: check.within,
            distance_from_target_m: check.distance_m,
        })
        .await
        .map_err(|e| duplicate_to_conflict(e, submission.location_type))?
        .into_model()
        .map_err(ApiError::Internal)?;

    record_attendance_marked(check.within);

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, auth.role, AuditAction::AttendanceRecord)
            .on_resource("task", task_id.to_string())
            .with_detail(format!(
                "{} at {:.1} m, within fence: {}",
                submission.location_type, check.distance_m, check.within
            ))
            .with_request_id(request_id.0)
            .build(),
    );

    let message = attendance_message(&attendance);

    Ok((
        StatusCode::CREATED,
        Json(MarkAttendanceResponse {
            success: true,
            message,
            attendance,
        }),
    ))
}

/// GET /api/v1/tasks/:task_id/attendance
pub async fn list_attendance(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(task_id): Path<Uuid>,
) -> Result<Json<Vec<Attendance>>, ApiError> {
    crate::routes::tasks::load_task_for_read(&state, &auth, task_id).await?;

    let repo = AttendanceRepository::new(state.pool.clone());
    let records = repo
        .list_by_task(task_id)
        .await?
        .into_iter()
        .map(|e| e.into_model())
        .collect::<Result<Vec<_>, _>>()
        .map_err(ApiError::Internal)?;

    Ok(Json(records))
}

/// The task coordinates the check-in is measured against.
///
/// A task without coordinates for the requested endpoint cannot be
/// geo-verified, so the submission is rejected outright rather than
/// stored with a meaningless verdict.
fn target_point(task: &Task, location_type: LocationType) -> Result<GeoPoint, ApiError> {
    let (lat, lng) = match location_type {
        LocationType::Pickup => (task.source_latitude, task.source_longitude),
        LocationType::Destination => (task.destination_latitude, task.destination_longitude),
    };

    match (lat, lng) {
        (Some(lat), Some(lng)) => Ok(GeoPoint::new(lat, lng)),
        _ => Err(ApiError::Validation(format!(
            "Task has no {location_type} coordinates configured"
        ))),
    }
}

fn attendance_message(attendance: &Attendance) -> String {
    if attendance.is_within_geofence {
        format!(
            "Attendance marked at {}: within area ({:.1} m from target)",
            attendance.location_type, attendance.distance_from_target_m
        )
    } else {
        format!(
            "Attendance marked at {}: outside area, noted ({:.1} m from target)",
            attendance.location_type, attendance.distance_from_target_m
        )
    }
}

/// Maps the unique-constraint race loser to a 409.
fn duplicate_to_conflict(err: sqlx::Error, location_type: LocationType) -> ApiError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return ApiError::Conflict(format!(
                "Attendance already marked at {location_type} for this task"
            ));
        }
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn task_with_coords() -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            pack_code: "PK-TEST01".to_string(),
            exam_type: "HSLC".to_string(),
            source_address: "src".to_string(),
            destination_address: "dst".to_string(),
            source_latitude: Some(26.1871),
            source_longitude: Some(91.7448),
            destination_latitude: None,
            destination_longitude: None,
            geofence_radius_m: 100.0,
            assigned_user_id: Uuid::new_v4(),
            window_start: now,
            window_end: now + Duration::hours(6),
            status: domain::models::task::TaskStatus::InProgress,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_target_point_pickup() {
        let task = task_with_coords();
        let point = target_point(&task, LocationType::Pickup).unwrap();
        assert_eq!(point.latitude, 26.1871);
        assert_eq!(point.longitude, 91.7448);
    }

    #[test]
    fn test_target_point_missing_coordinates_rejected() {
        let task = task_with_coords();
        assert!(matches!(
            target_point(&task, LocationType::Destination),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_attendance_message_flags_out_of_fence() {
        let attendance = Attendance {
            id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            location_type: LocationType::Destination,
            photo_url: "u".to_string(),
            photo_hash: "h".to_string(),
            latitude: 26.0,
            longitude: 91.0,
            is_within_geofence: false,
            distance_from_target_m: 812.4,
            recorded_at: Utc::now(),
        };
        let message = attendance_message(&attendance);
        assert!(message.contains("outside area, noted"));
        assert!(message.contains("812.4"));
    }
}
