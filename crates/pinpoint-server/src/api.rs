//! Feedback API routes
//!
//! - `POST /api/feedback` - Submit feedback (optionally authenticated)
//! - `GET /api/feedback?sessionId=` - List a session's feedback, newest first
//! - `GET /api/reports?sessionId=&format=json` - Session report
//! - `POST /api/share` - Share an owned feedback record (authenticated)
//!
//! Health, readiness and Prometheus endpoints are merged in from the
//! observability crate.

use axum::{
    Json, Router,
    body::Body,
    extract::{
        DefaultBodyLimit, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderName, HeaderValue, Method, Request, StatusCode, header},
    middleware,
    routing::{get, post},
};
use pinpoint_core::{Feedback, NewFeedback, Report, ReportFormat, Share, ShareRequest};
use pinpoint_observability::{HealthState, health_router};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, info_span, warn};

use crate::{
    app::{AppState, StoreReadiness},
    auth::AuthUser,
    config::{CorsConfig, ServerConfig},
    error::ApiError,
    middleware::{REQUEST_ID_HEADER, RequestId, metrics_middleware, request_id_middleware},
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackQuery {
    pub session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub session_id: Option<String>,
    pub format: Option<String>,
}

/// Build the full application router
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let health_state = HealthState::with_readiness_checker(
        state.metrics.clone(),
        Arc::new(StoreReadiness::new(state.store.clone())),
    );

    Router::new()
        .route("/api/feedback", post(create_feedback).get(list_feedback))
        .route("/api/reports", get(generate_report))
        .route("/api/share", post(share_feedback))
        .route_layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            metrics_middleware,
        ))
        .with_state(state)
        .merge(health_router(health_state))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(cors_layer(&config.cors))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                let request_id = req
                    .extensions()
                    .get::<RequestId>()
                    .map(|id| id.0.as_str())
                    .unwrap_or("-");
                info_span!(
                    "request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(middleware::from_fn(request_id_middleware))
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)]);

    if config.allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

/// Map a body rejection to a JSON error, keeping its status for
/// non-decode failures such as an oversized body
fn body_error(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
            ApiError::bad_request("Invalid request body")
        }
        other => ApiError::new(other.status(), other.body_text()),
    }
}

fn query_error(rejection: QueryRejection) -> ApiError {
    warn!(error = %rejection.body_text(), "Rejected query string");
    ApiError::new(rejection.status(), "Invalid query string")
}

async fn create_feedback(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    payload: Result<Json<NewFeedback>, JsonRejection>,
) -> Result<(StatusCode, Json<Feedback>), ApiError> {
    let Json(new) = payload.map_err(body_error)?;
    let user_id = auth.map(|AuthUser(user)| user.id);

    let feedback = state
        .feedback
        .create(new, user_id)
        .await
        .map_err(|e| ApiError::from_core(e, "Failed to create feedback"))?;

    state.metrics.record_feedback_created(
        feedback.kind.metric_label(),
        feedback.severity.metric_label(),
    );
    info!(
        feedback_id = %feedback.id,
        kind = %feedback.kind,
        severity = %feedback.severity,
        "Feedback created"
    );

    Ok((StatusCode::CREATED, Json(feedback)))
}

async fn list_feedback(
    State(state): State<AppState>,
    params: Result<Query<FeedbackQuery>, QueryRejection>,
) -> Result<Json<Vec<Feedback>>, ApiError> {
    let Query(params) = params.map_err(query_error)?;
    let items = state
        .feedback
        .list_by_session(params.session_id.as_deref())
        .await
        .map_err(|e| ApiError::from_core(e, "Failed to fetch feedback"))?;

    state.metrics.record_feedback_listed();
    Ok(Json(items))
}

async fn generate_report(
    State(state): State<AppState>,
    params: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Json<Report>, ApiError> {
    let Query(params) = params.map_err(query_error)?;
    let report = state
        .reports
        .generate(params.session_id.as_deref(), params.format.as_deref())
        .await
        .map_err(|e| ApiError::from_core(e, "Failed to generate report"))?;

    let format = params
        .format
        .as_deref()
        .and_then(|f| f.parse::<ReportFormat>().ok())
        .unwrap_or_default();
    state.metrics.record_report_generated(format.as_str());

    Ok(Json(report))
}

async fn share_feedback(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<ShareRequest>, JsonRejection>,
) -> Result<Json<Share>, ApiError> {
    let Json(request) = payload.map_err(body_error)?;

    let share = state
        .sharing
        .share(request, &user.id)
        .await
        .map_err(|e| ApiError::from_core(e, "Internal error"))?;

    state.metrics.record_share_created();
    Ok(Json(share))
}
