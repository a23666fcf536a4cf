//! User management route handlers (admin only).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use domain::models::audit_log::AuditAction;
use domain::models::user::{CreateUserRequest, User, UserRole};
use domain::services::audit::AuditLogBuilder;
use persistence::repositories::{CreateUserInput, UserRepository};
use shared::password::hash_password;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::trace_id::RequestId;
use crate::services::audit;

/// POST /api/v1/users
///
/// Creates an officer or admin account. Duplicate emails surface as 409.
pub async fn create_user(
    State(state): State<AppState>,
    auth: UserAuth,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    request.validate()?;

    let password_hash =
        hash_password(&request.password).map_err(|e| ApiError::Internal(e.to_string()))?;

    let repo = UserRepository::new(state.pool.clone());
    let user = repo
        .create(CreateUserInput {
            email: request.email,
            display_name: request.display_name,
            password_hash,
            role: request.role.to_string(),
        })
        .await?
        .into_model()
        .map_err(ApiError::Internal)?;

    audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, auth.role, AuditAction::UserCreate)
            .on_resource("user", user.id.to_string())
            .with_detail(format!("role {}", user.role))
            .with_request_id(request_id.0)
            .build(),
    );

    Ok((StatusCode::CREATED, Json(user)))
}

/// Query parameters for listing users.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListUsersQuery {
    pub role: Option<UserRole>,
}

/// GET /api/v1/users
///
/// Used by the task-creation form to pick an assignee.
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    let repo = UserRepository::new(state.pool.clone());
    let users = repo
        .list(query.role.map(|r| r.to_string()).as_deref())
        .await?
        .into_iter()
        .map(|e| e.into_model())
        .collect::<Result<Vec<_>, _>>()
        .map_err(ApiError::Internal)?;

    Ok(Json(users))
}

/// GET /api/v1/users/:user_id
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    let repo = UserRepository::new(state.pool.clone());
    let user = repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?
        .into_model()
        .map_err(ApiError::Internal)?;

    Ok(Json(user))
}
