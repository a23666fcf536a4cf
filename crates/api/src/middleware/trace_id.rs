//! Request ID propagation for log correlation.
//!
//! Every request carries an ID, either supplied by the caller in
//! `X-Request-ID` or generated here. The ID lands in a tracing span, in
//! request extensions (audit rows record it), and in the response.

use axum::{
    body::Body,
    http::{header::HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use uuid::Uuid;

/// Header carrying the request ID in both directions.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// The request's correlation ID, available from request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Assigns a request ID, wraps the request in a span, and logs the
/// outcome with timing once the response is ready.
pub async fn trace_id(mut req: Request<Body>, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %id,
        method = %req.method(),
        path = %req.uri().path(),
    );
    let _entered = span.enter();

    let started = Instant::now();
    let mut response = next.run(req).await;

    tracing::info!(
        request_id = %id,
        status = response.status().as_u16(),
        duration_ms = started.elapsed().as_millis() as u64,
        "Request completed"
    );

    if let Ok(value) = HeaderValue::from_str(&id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-request-id"), value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_is_cloneable_into_extensions() {
        let mut extensions = axum::http::Extensions::new();
        extensions.insert(RequestId("corr-1".to_string()));
        assert_eq!(extensions.get::<RequestId>().unwrap().0, "corr-1");
    }

    #[test]
    fn test_generated_ids_are_valid_header_values() {
        let id = Uuid::new_v4().to_string();
        assert!(HeaderValue::from_str(&id).is_ok());
    }
}
