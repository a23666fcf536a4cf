//! User JWT authentication middleware.
//!
//! Validates Bearer tokens and stores the authenticated identity in
//! request extensions. The access token carries the user role, so role
//! checks here need no database round trip.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use domain::models::user::UserRole;
use serde_json::json;
use shared::jwt::JwtConfig;
use uuid::Uuid;

use crate::app::AppState;

/// Authenticated user information extracted from JWT.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// User ID from the JWT subject claim.
    pub user_id: Uuid,
    /// Role from the JWT role claim.
    pub role: UserRole,
    /// JWT ID (jti) for session tracking.
    pub jti: String,
}

impl UserAuth {
    /// Validates an access token and returns user authentication info.
    pub fn validate(jwt_config: &JwtConfig, token: &str) -> Result<Self, String> {
        let claims = jwt_config
            .validate_access_token(token)
            .map_err(|e| format!("Invalid token: {}", e))?;

        let user_id =
            Uuid::parse_str(&claims.sub).map_err(|_| "Invalid user ID in token".to_string())?;

        let role: UserRole = claims
            .role
            .parse()
            .map_err(|_| "Invalid role in token".to_string())?;

        Ok(UserAuth {
            user_id,
            role,
            jti: claims.jti,
        })
    }
}

/// Middleware that requires JWT user authentication.
///
/// Validates the Bearer token in the Authorization header and rejects
/// requests without a valid JWT. Authenticated user information is stored
/// in request extensions for downstream handlers.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    match UserAuth::validate(&state.jwt, token) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!("JWT validation failed: {}", e);
            unauthorized_response("Invalid or expired token")
        }
    }
}

/// Middleware that requires an authenticated admin user.
///
/// Validates the token itself rather than stacking on `require_user_auth`,
/// so admin routes need only one auth layer.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    match UserAuth::validate(&state.jwt, token) {
        Ok(auth) if auth.role == UserRole::Admin => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Ok(_) => forbidden_response("Admin access required"),
        Err(e) => {
            tracing::debug!("JWT validation failed: {}", e);
            unauthorized_response("Invalid or expired token")
        }
    }
}

/// Helper to create unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": message
        })),
    )
        .into_response()
}

/// Helper to create forbidden response.
fn forbidden_response(message: &str) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "forbidden",
            "message": message
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_jwt_config() -> JwtConfig {
        JwtConfig::new_for_testing("user_auth_middleware_test_secret")
    }

    #[test]
    fn test_validate_round_trip() {
        let config = test_jwt_config();
        let user_id = Uuid::new_v4();
        let (token, jti) = config.generate_access_token(user_id, "officer").unwrap();

        let auth = UserAuth::validate(&config, &token).unwrap();
        assert_eq!(auth.user_id, user_id);
        assert_eq!(auth.role, UserRole::Officer);
        assert_eq!(auth.jti, jti);
    }

    #[test]
    fn test_validate_rejects_refresh_token() {
        let config = test_jwt_config();
        let (token, _) = config
            .generate_refresh_token(Uuid::new_v4(), "officer")
            .unwrap();
        assert!(UserAuth::validate(&config, &token).is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_role() {
        let config = test_jwt_config();
        let (token, _) = config
            .generate_access_token(Uuid::new_v4(), "superuser")
            .unwrap();
        assert!(UserAuth::validate(&config, &token).is_err());
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let config = test_jwt_config();
        assert!(UserAuth::validate(&config, "not.a.jwt").is_err());
    }

    #[test]
    fn test_unauthorized_response() {
        let response = unauthorized_response("Test message");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_forbidden_response() {
        let response = forbidden_response("Admin access required");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
