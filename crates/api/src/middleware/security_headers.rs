//! Browser hardening headers applied to every response.

use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

const BASE_HEADERS: [(&str, &str); 3] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
];

/// Adds nosniff, frame-deny and XSS-filter headers to all responses.
///
/// `Strict-Transport-Security` is opt-in via `PT__SECURITY__HSTS_ENABLED`
/// since it must only appear once HTTPS termination is in place.
pub async fn security_headers_middleware(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in BASE_HEADERS {
        headers.insert(
            header::HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    let hsts_enabled = std::env::var("PT__SECURITY__HSTS_ENABLED")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if hsts_enabled {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_headers_are_valid_static_values() {
        for (name, value) in BASE_HEADERS {
            assert!(!header::HeaderName::from_static(name).as_str().is_empty());
            assert!(HeaderValue::from_static(value).to_str().is_ok());
        }
    }

    #[test]
    fn test_hsts_defaults_off_when_unset() {
        let enabled = std::env::var("PT__SECURITY__HSTS_ENABLED_NONEXISTENT_VAR")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        assert!(!enabled);
    }
}
