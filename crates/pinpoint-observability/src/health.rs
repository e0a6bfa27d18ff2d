//! Health endpoints
//!
//! This module provides HTTP health check endpoints:
//! - `/healthz` - Liveness probe (always returns 200 OK if server is running)
//! - `/readyz` - Readiness probe (checks the feedback store)
//! - `/metrics` - Prometheus metrics endpoint

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus::TextEncoder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::metrics::Metrics;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Readiness check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ComponentStatus>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Status of one dependency in a readiness check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentStatus {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: "healthy".to_string(),
            error: None,
        }
    }

    pub fn unhealthy(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: "unhealthy".to_string(),
            error: Some(error.into()),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.error.is_none()
    }
}

/// Readiness checker trait
#[async_trait]
pub trait ReadinessChecker: Send + Sync {
    /// Check every dependency; the service is ready when all are healthy
    async fn check(&self) -> Vec<ComponentStatus>;
}

/// Health check state
#[derive(Clone)]
pub struct HealthState {
    /// Metrics collector
    pub metrics: Arc<Metrics>,
    /// Optional readiness checker
    pub readiness_checker: Option<Arc<dyn ReadinessChecker>>,
}

impl HealthState {
    /// Create a new health state
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self {
            metrics,
            readiness_checker: None,
        }
    }

    /// Create a new health state with readiness checker
    pub fn with_readiness_checker(
        metrics: Arc<Metrics>,
        readiness_checker: Arc<dyn ReadinessChecker>,
    ) -> Self {
        Self {
            metrics,
            readiness_checker: Some(readiness_checker),
        }
    }
}

/// Create health check router
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Liveness probe handler
async fn healthz() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: None,
    })
}

/// Readiness probe handler
///
/// Returns 200 OK if every component is healthy, 503 otherwise
async fn readyz(State(state): State<HealthState>) -> Response {
    let Some(checker) = &state.readiness_checker else {
        // No readiness checker, assume ready
        return (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready".to_string(),
                components: None,
                message: None,
            }),
        )
            .into_response();
    };

    let components = checker.check().await;
    if components.iter().all(ComponentStatus::is_healthy) {
        (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready".to_string(),
                components: Some(components),
                message: None,
            }),
        )
            .into_response()
    } else {
        warn!(?components, "Readiness check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready".to_string(),
                components: Some(components),
                message: Some("One or more components are unavailable".to_string()),
            }),
        )
            .into_response()
    }
}

/// Prometheus metrics handler
///
/// Returns metrics in Prometheus text format
async fn metrics_handler(State(state): State<HealthState>) -> Response {
    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry().gather();

    match encoder.encode_to_string(&metric_families) {
        Ok(body) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode metrics: {}", err),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt; // for oneshot

    struct MockReadinessChecker {
        ready: bool,
    }

    #[async_trait]
    impl ReadinessChecker for MockReadinessChecker {
        async fn check(&self) -> Vec<ComponentStatus> {
            if self.ready {
                vec![ComponentStatus::healthy("database")]
            } else {
                vec![ComponentStatus::unhealthy("database", "unable to open file")]
            }
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_healthz() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let state = HealthState::new(metrics);
        let app = health_router(state);

        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readyz_ready() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let checker = Arc::new(MockReadinessChecker { ready: true });
        let state = HealthState::with_readiness_checker(metrics, checker);
        let app = health_router(state);

        let response = app
            .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["components"][0]["name"], "database");
    }

    #[tokio::test]
    async fn test_readyz_not_ready() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let checker = Arc::new(MockReadinessChecker { ready: false });
        let state = HealthState::with_readiness_checker(metrics, checker);
        let app = health_router(state);

        let response = app
            .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["status"], "not_ready");
        assert_eq!(body["components"][0]["error"], "unable to open file");
    }

    #[tokio::test]
    async fn test_readyz_no_checker() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let state = HealthState::new(metrics);
        let app = health_router(state);

        let response = app
            .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics() {
        let metrics = Arc::new(Metrics::new().unwrap());
        metrics.record_feedback_created("bug", "high");
        let state = HealthState::new(metrics);
        let app = health_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/plain; version=0.0.4"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("pinpoint_feedback_created_total"));
    }

    #[test]
    fn test_component_status_serialization() {
        let status = ComponentStatus::healthy("database");
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"name\":\"database\""));
        assert!(!json.contains("error"));
    }
}
