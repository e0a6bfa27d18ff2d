//! Shared API middleware

use axum::{
    extract::{MatchedPath, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use pinpoint_observability::Metrics;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID assigned to a request, available to handlers as an extension
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Middleware to tag every request and response with a request ID
///
/// A well-formed incoming `x-request-id` is kept; otherwise a UUID is generated.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Middleware to record request latency and error responses per route
///
/// Must be installed with `route_layer` so the matched route is known.
pub async fn metrics_middleware(
    State(metrics): State<Arc<Metrics>>,
    req: Request,
    next: Next,
) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let start = Instant::now();
    let response = next.run(req).await;
    metrics.observe_request(&route, start.elapsed().as_secs_f64());

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        metrics.record_api_error(&route, status.as_u16());
    }

    response
}
