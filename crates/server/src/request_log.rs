use std::time::Instant;

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Logs one line per request and echoes a correlation id back to the caller.
/// An incoming `x-request-id` is reused, otherwise a fresh one is generated.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let correlation_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let mut response = next.run(request).await;

    let status = response.status();
    let latency_ms = started.elapsed().as_millis() as u64;
    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    if status.is_server_error() {
        warn!(
            event_name = "http.request.failed",
            correlation_id = %correlation_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms,
            "request failed"
        );
    } else {
        info!(
            event_name = "http.request.completed",
            correlation_id = %correlation_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms,
            "request completed"
        );
    }

    response
}
