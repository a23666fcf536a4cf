//! Authentication route handlers.
//!
//! Password login and refresh-token exchange. Failed logins are audited
//! with the attempted email so brute-force attempts leave a trail.

use axum::{extract::State, http::HeaderMap, Extension, Json};
use validator::Validate;

use domain::models::audit_log::AuditAction;
use domain::models::user::{LoginRequest, RefreshRequest, TokenPairResponse, User};
use domain::services::audit::AuditLogBuilder;
use persistence::repositories::UserRepository;
use shared::jwt::extract_user_id;
use shared::password::verify_password;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::trace_id::RequestId;
use crate::routes::client_ip;
use crate::services::audit;

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    request.validate()?;

    let repo = UserRepository::new(state.pool.clone());
    let user = match repo.find_by_email(&request.email).await? {
        Some(entity) => entity.into_model().map_err(ApiError::Internal)?,
        None => {
            audit_login_failure(&state, &headers, &request_id, &request.email, "unknown email");
            return Err(invalid_credentials());
        }
    };

    let password_ok = verify_password(&request.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    if !password_ok {
        audit_login_failure(&state, &headers, &request_id, &request.email, "wrong password");
        return Err(invalid_credentials());
    }

    if !user.active {
        audit_login_failure(&state, &headers, &request_id, &request.email, "inactive account");
        return Err(invalid_credentials());
    }

    let tokens = issue_token_pair(&state, &user)?;

    let mut entry = AuditLogBuilder::user_action(user.id, user.role, AuditAction::AuthLogin)
        .on_resource("user", user.id.to_string())
        .with_request_id(request_id.0.clone());
    if let Some(ip) = client_ip(&headers) {
        entry = entry.with_ip(ip);
    }
    audit::record(&state.pool, entry.build());

    Ok(Json(tokens))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let claims = state.jwt.validate_refresh_token(&request.refresh_token)?;
    let user_id = extract_user_id(&claims)?;

    let repo = UserRepository::new(state.pool.clone());
    let user = repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unknown user".to_string()))?
        .into_model()
        .map_err(ApiError::Internal)?;

    if !user.active {
        return Err(ApiError::Unauthorized("Account is disabled".to_string()));
    }

    let tokens = issue_token_pair(&state, &user)?;

    let mut entry = AuditLogBuilder::user_action(user.id, user.role, AuditAction::AuthRefresh)
        .on_resource("user", user.id.to_string())
        .with_request_id(request_id.0.clone());
    if let Some(ip) = client_ip(&headers) {
        entry = entry.with_ip(ip);
    }
    audit::record(&state.pool, entry.build());

    Ok(Json(tokens))
}

fn issue_token_pair(state: &AppState, user: &User) -> Result<TokenPairResponse, ApiError> {
    let role = user.role.to_string();
    let (access_token, _) = state.jwt.generate_access_token(user.id, &role)?;
    let (refresh_token, _) = state.jwt.generate_refresh_token(user.id, &role)?;

    Ok(TokenPairResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in_secs: state.jwt.access_token_expiry_secs,
    })
}

/// Uniform rejection so responses do not reveal whether the email exists.
fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid email or password".to_string())
}

fn audit_login_failure(
    state: &AppState,
    headers: &HeaderMap,
    request_id: &RequestId,
    email: &str,
    reason: &str,
) {
    let mut entry = AuditLogBuilder::anonymous_action(AuditAction::AuthLoginFailed)
        .on_resource("user", email)
        .with_detail(reason)
        .with_request_id(request_id.0.clone());
    if let Some(ip) = client_ip(headers) {
        entry = entry.with_ip(ip);
    }
    audit::record(&state.pool, entry.build());
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_invalid_credentials_is_unauthorized() {
        let response = invalid_credentials().into_response();
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
