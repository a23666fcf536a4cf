//! Checkpoint event route handlers.
//!
//! Once-only semantics come from the database, not from application
//! checks: the insert races straight into the `(task_id, event_type)`
//! unique constraint and a loser surfaces as 409.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use domain::models::audit_log::AuditAction;
use domain::models::task::Task;
use domain::models::task_event::{EventSubmission, EventType, RecordEventResponse, TaskEvent};
use domain::services::assignment::{validate_assignment, AssignmentError};
use domain::services::audit::AuditLogBuilder;
use persistence::repositories::{AgentLocationRepository, TaskEventRepository, TaskRepository};
use shared::crypto::sha256_hex;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_event_recorded;
use crate::middleware::trace_id::RequestId;
use crate::routes::{audit_assignment_denied, read_photo_upload};
use crate::services::audit;
use crate::services::notification::TaskTransitionPayload;

/// POST /api/v1/tasks/:task_id/events
///
/// Multipart submission: `event_type`, `latitude`, `longitude` text
/// fields plus the `image` part.
pub async fn record_event(
    State(state): State<AppState>,
    auth: UserAuth,
    Extension(request_id): Extension<RequestId>,
    Path(task_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<RecordEventResponse>), ApiError> {
    let upload = read_photo_upload(multipart).await?;

    let submission = EventSubmission {
        event_type: upload.parse_field("event_type")?,
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
            audit_assignment_denied(&state, &auth, task_id, &request_id, "checkpoint event");
        }
        return Err(e.into());
    }

    let photo_hash = sha256_hex(&upload.photo);
    let photo_url = state
        .storage
        .store("events", &photo_hash, &upload.photo)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let event_repo = TaskEventRepository::new(state.pool.clone());
    let event = event_repo
        .insert(
            task_id,
            &submission.event_type.to_string(),
            &photo_url,
            &photo_hash,
            submission.latitude,
            submission.longitude,
        )
        .await
        .map_err(|e| duplicate_to_conflict(e, submission.event_type))?
        .into_model()
        .map_err(ApiError::Internal)?;

    record_event_recorded(&submission.event_type.to_string());

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, auth.role, AuditAction::EventRecord)
            .on_resource("task", task_id.to_string())
            .with_detail(submission.event_type.to_string())
            .with_request_id(request_id.0.clone())
            .build(),
    );

    // The first recorded event moves a pending task into in_progress.
    task_repo.mark_in_progress_if_pending(task_id).await?;

    if submission.event_type.is_terminal() {
        complete_task(&state, &task, auth.user_id).await?;
    }

    Ok((
        StatusCode::CREATED,
        Json(RecordEventResponse {
            success: true,
            message: format!("{} recorded", event.event_type),
            event,
        }),
    ))
}

/// GET /api/v1/tasks/:task_id/events
pub async fn list_events(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(task_id): Path<Uuid>,
) -> Result<Json<Vec<TaskEvent>>, ApiError> {
    crate::routes::tasks::load_task_for_read(&state, &auth, task_id).await?;

    let repo = TaskEventRepository::new(state.pool.clone());
    let events = repo
        .list_by_task(task_id)
        .await?
        .into_iter()
        .map(|e| e.into_model())
        .collect::<Result<Vec<_>, _>>()
        .map_err(ApiError::Internal)?;

    Ok(Json(events))
}

/// Terminal event follow-through: complete the task, drop the officer's
/// live marker so the map does not show a finished delivery, and notify.
async fn complete_task(state: &AppState, task: &Task, officer_id: Uuid) -> Result<(), ApiError> {
    let task_repo = TaskRepository::new(state.pool.clone());
    let completed = task_repo
        .update_status(task.id, "completed")
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?
        .into_model()
        .map_err(ApiError::Internal)?;

    let location_repo = AgentLocationRepository::new(state.pool.clone());
    if let Err(e) = location_repo.clear(officer_id).await {
        // Marker cleanup is best effort; the delivery itself completed.
        tracing::warn!(task_id = %task.id, error = %e, "Failed to clear live location marker");
    }

    state.notifier.notify_task_transition(TaskTransitionPayload {
        task_id: completed.id,
        pack_code: completed.pack_code.clone(),
        status: completed.status,
        detail: "submission_at_post_office recorded".to_string(),
    });

    Ok(())
}

/// Maps the unique-constraint race loser to a 409 with a message naming
/// the duplicated checkpoint.
fn duplicate_to_conflict(err: sqlx::Error, event_type: EventType) -> ApiError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return ApiError::Conflict(format!("{event_type} already recorded for this task"));
        }
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_to_conflict_passes_through_other_errors() {
        let err = duplicate_to_conflict(sqlx::Error::RowNotFound, EventType::OpeningSeal);
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
