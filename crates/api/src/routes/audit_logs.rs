//! Audit log route handlers (admin only).

use axum::{
    extract::{Query, State},
    Json,
};

use domain::models::audit_log::{AuditLog, ListAuditLogsQuery};
use persistence::repositories::AuditLogRepository;

use crate::app::AppState;
use crate::error::ApiError;

/// GET /api/v1/audit-logs
///
/// Newest first, filterable by actor, action, outcome and time range.
pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(query): Query<ListAuditLogsQuery>,
) -> Result<Json<Vec<AuditLog>>, ApiError> {
    let repo = AuditLogRepository::new(state.pool.clone());
    let entries = repo
        .list(&query)
        .await?
        .into_iter()
        .map(|e| e.into_model())
        .collect::<Result<Vec<_>, _>>()
        .map_err(ApiError::Internal)?;

    Ok(Json(entries))
}
