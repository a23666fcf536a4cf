//! HTTP route handlers.

pub mod attendance;
pub mod audit_logs;
pub mod auth;
pub mod health;
pub mod task_events;
pub mod tasks;
pub mod users;

use axum::extract::Multipart;
use axum::http::HeaderMap;
use std::collections::HashMap;
use std::net::IpAddr;

use crate::error::ApiError;

/// A parsed multipart photo submission: plain text fields plus the photo
/// bytes from the `image` part.
pub(crate) struct PhotoUpload {
    pub fields: HashMap<String, String>,
    pub photo: Vec<u8>,
}

impl PhotoUpload {
    /// Fetches a required text field by name.
    pub fn field(&self, name: &str) -> Result<&str, ApiError> {
        self.fields
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ApiError::Validation(format!("Missing field: {name}")))
    }

    /// Parses a required text field into `T`.
    pub fn parse_field<T: std::str::FromStr>(&self, name: &str) -> Result<T, ApiError> {
        self.field(name)?
            .parse()
            .map_err(|_| ApiError::Validation(format!("Invalid value for field: {name}")))
    }
}

/// Writes the audit row for a submission rejected because the caller is
/// not the assigned officer. These rejections are security-relevant and
/// always leave a trail.
pub(crate) fn audit_assignment_denied(
    state: &crate::app::AppState,
    auth: &crate::extractors::UserAuth,
    task_id: uuid::Uuid,
    request_id: &crate::middleware::trace_id::RequestId,
    context: &str,
) {
    use domain::models::audit_log::AuditAction;
    use domain::services::audit::AuditLogBuilder;

    crate::services::audit::record(
        &state.pool,
        AuditLogBuilder::user_action(auth.user_id, auth.role, AuditAction::AssignmentDenied)
            .on_resource("task", task_id.to_string())
            .denied(format!("{context}: caller is not the assigned officer"))
            .with_request_id(request_id.0.clone())
            .build(),
    );
}

/// Drains a multipart body into text fields and the `image` part.
///
/// Unknown parts are ignored; a missing or empty image is rejected since
/// every checkpoint submission requires photographic proof.
pub(crate) async fn read_photo_upload(mut multipart: Multipart) -> Result<PhotoUpload, ApiError> {
    let mut fields = HashMap::new();
    let mut photo: Option<Vec<u8>> = None;

    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = part.name().map(|n| n.to_string()) else {
            continue;
        };

        if name == "image" {
            let bytes = part
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("Failed to read image: {e}")))?;
            photo = Some(bytes.to_vec());
        } else {
            let text = part
                .text()
                .await
                .map_err(|e| ApiError::Validation(format!("Failed to read field {name}: {e}")))?;
            fields.insert(name, text);
        }
    }

    let photo = photo.ok_or_else(|| ApiError::Validation("Missing image".to_string()))?;
    if photo.is_empty() {
        return Err(ApiError::Validation("Empty image".to_string()));
    }

    Ok(PhotoUpload { fields, photo })
}

/// Extracts the client IP from proxy headers, if present.
///
/// The service runs behind a reverse proxy, so the socket peer address is
/// the proxy; `X-Forwarded-For` (first hop) and `X-Real-IP` are checked
/// in that order.
pub(crate) fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            if let Ok(ip) = first.trim().parse() {
                return Some(ip);
            }
        }
    }
    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_forwarded_for_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers), Some("203.0.113.7".parse().unwrap()));
    }

    #[test]
    fn test_client_ip_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_ip(&headers), Some("198.51.100.2".parse().unwrap()));
    }

    #[test]
    fn test_client_ip_absent() {
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }

    #[test]
    fn test_client_ip_garbage_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));
        assert_eq!(client_ip(&headers), None);
    }
}
