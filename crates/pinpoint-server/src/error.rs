//! HTTP error responses
//!
//! Every failure leaves the API as `{"error": "<message>"}`. Client errors
//! carry a short message; server errors are logged with detail and replaced
//! by a generic message for the operation that failed.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pinpoint_core::Error;
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Map a core error, using `failure` as the message for server-side errors
    pub fn from_core(err: Error, failure: &str) -> Self {
        if !err.is_client_error() {
            error!(error = %err, "{}", failure);
            return Self::internal(failure);
        }

        match err {
            Error::Validation(msg) => Self::bad_request(msg),
            Error::UnsupportedFormat(_) => Self::bad_request("Unsupported format"),
            Error::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, msg),
            _ => Self::unauthorized(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_keep_their_message() {
        let err = ApiError::from_core(
            Error::Validation("Missing required fields".to_string()),
            "Failed to create feedback",
        );
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Missing required fields");

        let err = ApiError::from_core(
            Error::NotFound("User not found".to_string()),
            "Internal error",
        );
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "User not found");
    }

    #[test]
    fn test_unsupported_format_message() {
        let err = ApiError::from_core(
            Error::UnsupportedFormat("pdf".to_string()),
            "Failed to generate report",
        );
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Unsupported format");
    }

    #[test]
    fn test_store_errors_are_generic() {
        let err = ApiError::from_core(
            Error::Store("disk I/O error at /var/lib/pinpoint".to_string()),
            "Failed to fetch feedback",
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Failed to fetch feedback");
    }

    #[tokio::test]
    async fn test_response_body_shape() {
        let response = ApiError::unauthorized().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Unauthorized" }));
    }
}
