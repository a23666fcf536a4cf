//! Delivery task route handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain::models::agent_location::AgentCurrentLocation;
use domain::models::audit_log::AuditAction;
use domain::models::task::{
    CreateTaskRequest, ListTasksQuery, ListTasksResponse, Task, UpdateTaskStatusRequest,
};
use domain::models::user::UserRole;
use domain::services::audit::AuditLogBuilder;
use persistence::repositories::{AgentLocationRepository, CreateTaskInput, TaskListFilter, TaskRepository};
use shared::pagination::{decode_cursor, encode_cursor};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::trace_id::RequestId;
use crate::services::audit;
use crate::services::notification::TaskTransitionPayload;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

/// POST /api/v1/tasks (admin)
pub async fn create_task(
    State(state): State<AppState>,
    auth: UserAuth,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    request.validate()?;
    request.validate_window().map_err(ApiError::Validation)?;

    let repo = TaskRepository::new(state.pool.clone());
    let task = repo
        .create(CreateTaskInput {
            pack_code: request.pack_code,
            exam_type: request.exam_type,
            source_address: request.source_address,
            destination_address: request.destination_address,
            source_latitude: request.source_latitude,
            source_longitude: request.source_longitude,
            destination_latitude: request.destination_latitude,
            destination_longitude: request.destination_longitude,
            geofence_radius_m: request.geofence_radius_m,
            assigned_user_id: request.assigned_user_id,
            window_start: request.window_start,
            window_end: request.window_end,
        })
        .await?
        .into_model()
        .map_err(ApiError::Internal)?;

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, auth.role, AuditAction::TaskCreate)
            .on_resource("task", task.id.to_string())
            .with_detail(task.pack_code.clone())
            .with_request_id(request_id.0)
            .build(),
    );

    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/v1/tasks
///
/// Admins see everything; officers only their own assignments regardless
/// of the filter they send.
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<ListTasksResponse>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    let assigned_user_id = match auth.role {
        UserRole::Admin => query.assigned_user_id,
        UserRole::Officer => Some(auth.user_id),
    };

    let repo = TaskRepository::new(state.pool.clone());
    // Fetch one extra row to learn whether another page exists.
    let mut entities = repo
        .list(TaskListFilter {
            status: query.status.map(|s| s.to_string()),
            assigned_user_id,
            limit: limit + 1,
            offset,
        })
        .await?;

    let has_more = entities.len() as i64 > limit;
    entities.truncate(limit as usize);

    let tasks = entities
        .into_iter()
        .map(|e| e.into_model())
        .collect::<Result<Vec<_>, _>>()
        .map_err(ApiError::Internal)?;

    Ok(Json(ListTasksResponse { tasks, has_more }))
}

/// GET /api/v1/tasks/:task_id
pub async fn get_task(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(task_id): Path<Uuid>,
) -> Result<Json<Task>, ApiError> {
    let task = load_task_for_read(&state, &auth, task_id).await?;
    Ok(Json(task))
}

/// PATCH /api/v1/tasks/:task_id/status (admin)
///
/// Unconditional transition; this is how operators flag a task as
/// `suspicious` or manually close one out.
pub async fn update_task_status(
    State(state): State<AppState>,
    auth: UserAuth,
    Extension(request_id): Extension<RequestId>,
    Path(task_id): Path<Uuid>,
    Json(request): Json<UpdateTaskStatusRequest>,
) -> Result<Json<Task>, ApiError> {
    let repo = TaskRepository::new(state.pool.clone());
    let task = repo
        .update_status(task_id, &request.status.to_string())
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?
        .into_model()
        .map_err(ApiError::Internal)?;

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, auth.role, AuditAction::TaskStatusChange)
            .on_resource("task", task.id.to_string())
            .with_detail(format!("status set to {}", task.status))
            .with_request_id(request_id.0)
            .build(),
    );

    state.notifier.notify_task_transition(TaskTransitionPayload {
        task_id: task.id,
        pack_code: task.pack_code.clone(),
        status: task.status,
        detail: "status changed by admin".to_string(),
    });

    Ok(Json(task))
}

/// GET /api/v1/tasks/:task_id/location
///
/// The officer's live marker for this task, or 404 if nobody is
/// currently reporting on it.
pub async fn get_task_location(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(task_id): Path<Uuid>,
) -> Result<Json<AgentCurrentLocation>, ApiError> {
    load_task_for_read(&state, &auth, task_id).await?;

    let repo = AgentLocationRepository::new(state.pool.clone());
    let location = repo
        .find_by_task(task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No live location for this task".to_string()))?;

    Ok(Json(location.into()))
}

/// Query parameters for the history replay endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LocationHistoryQuery {
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}

/// One replayed history point.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LocationHistoryPoint {
    pub user_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

/// Response payload for the history replay endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LocationHistoryResponse {
    pub points: Vec<LocationHistoryPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// GET /api/v1/tasks/:task_id/location/history
///
/// Replays the append-only ping log for a task, oldest first, with an
/// opaque keyset cursor.
pub async fn get_task_location_history(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(task_id): Path<Uuid>,
    Query(query): Query<LocationHistoryQuery>,
) -> Result<Json<LocationHistoryResponse>, ApiError> {
    load_task_for_read(&state, &auth, task_id).await?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let after = match query.cursor.as_deref() {
        Some(cursor) => Some(decode_cursor(cursor)?),
        None => None,
    };

    let repo = AgentLocationRepository::new(state.pool.clone());
    let rows = repo.history_for_task(task_id, after, limit).await?;

    let next_cursor = if rows.len() as i64 == limit {
        rows.last().map(|row| encode_cursor(row.recorded_at, row.id))
    } else {
        None
    };

    let points = rows
        .into_iter()
        .map(|row| LocationHistoryPoint {
            user_id: row.user_id,
            latitude: row.latitude,
            longitude: row.longitude,
            accuracy: row.accuracy,
            heading: row.heading,
            speed: row.speed,
            recorded_at: row.recorded_at,
        })
        .collect();

    Ok(Json(LocationHistoryResponse {
        points,
        next_cursor,
    }))
}

/// Loads a task and enforces read visibility: admins see every task,
/// officers get 404 for tasks that are not theirs.
pub(crate) async fn load_task_for_read(
    state: &AppState,
    auth: &UserAuth,
    task_id: Uuid,
) -> Result<Task, ApiError> {
    let repo = TaskRepository::new(state.pool.clone());
    let task = repo
        .find_by_id(task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?
        .into_model()
        .map_err(ApiError::Internal)?;

    if auth.role == UserRole::Officer && task.assigned_user_id != auth.user_id {
        // Hidden rather than forbidden so officers cannot probe for
        // other deliveries' task IDs.
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(task)
}
