//! Gateway error types
//!
//! Every failure maps to a fixed, generic JSON body. Upstream detail is
//! logged, never returned to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body returned for any upstream failure
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred while processing the request.";
/// Body returned when the caller's payload is not a JSON object
pub const BAD_REQUEST_MESSAGE: &str = "Request body must be a JSON object.";

/// JSON error envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Relay failure
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The pricing engine could not be reached
    #[error("pricing engine unreachable: {0}")]
    Transport(String),

    /// The pricing engine answered with a non-success status
    #[error("pricing engine returned status {status}")]
    Upstream { status: u16, body: String },

    /// The pricing engine answered with something other than JSON
    #[error("pricing engine returned invalid JSON: {0}")]
    Parse(String),

    /// The caller's body could not be read as a JSON object
    #[error("invalid request body: {0}")]
    BadRequest(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Transport(_)
            | GatewayError::Upstream { .. }
            | GatewayError::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            GatewayError::BadRequest(_) => BAD_REQUEST_MESSAGE,
            _ => GENERIC_ERROR_MESSAGE,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.public_message().to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: GatewayError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_upstream_body_is_not_leaked() {
        let (status, body) = body_of(GatewayError::Upstream {
            status: 502,
            body: "stack trace from engine".to_string(),
        })
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, GENERIC_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_transport_and_parse_are_500() {
        let (status, body) = body_of(GatewayError::Transport("refused".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, GENERIC_ERROR_MESSAGE);

        let (status, _) = body_of(GatewayError::Parse("eof".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_bad_request_is_400() {
        let (status, body) = body_of(GatewayError::BadRequest("expected object".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, BAD_REQUEST_MESSAGE);
    }

    #[test]
    fn test_display_keeps_detail_for_logs() {
        let err = GatewayError::Upstream {
            status: 503,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "pricing engine returned status 503");
    }
}
