//! API error handling.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use fml_core::error::FmlError;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: String,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.into(),
        }
    }

    /// Bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "BAD_REQUEST")
    }

    /// Internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, "INTERNAL_ERROR")
    }

    /// Status code this error responds with.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &str {
        &self.code
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<FmlError> for ApiError {
    fn from(err: FmlError) -> Self {
        match &err {
            FmlError::InvalidRequestUrl { .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, err.to_string(), "INVALID_REQUEST_URL")
            }
            FmlError::UpstreamNotAllowed(_) => {
                ApiError::new(StatusCode::FORBIDDEN, err.to_string(), "UPSTREAM_NOT_ALLOWED")
            }
            FmlError::UpstreamUnavailable { .. } => {
                ApiError::new(StatusCode::BAD_GATEWAY, err.to_string(), "UPSTREAM_UNAVAILABLE")
            }
            FmlError::UpstreamTimeout { .. } => {
                ApiError::new(StatusCode::GATEWAY_TIMEOUT, err.to_string(), "UPSTREAM_TIMEOUT")
            }
            FmlError::InvalidUpstreamResponse { .. } => ApiError::new(
                StatusCode::BAD_GATEWAY,
                err.to_string(),
                "UPSTREAM_INVALID_RESPONSE",
            ),
            _ => {
                tracing::error!(error = %err, "Internal error");
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (
                FmlError::InvalidRequestUrl {
                    url: "x".into(),
                    reason: "relative URL without a base".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (FmlError::UpstreamNotAllowed("evil".into()), StatusCode::FORBIDDEN),
            (
                FmlError::UpstreamUnavailable {
                    url: "http://node".into(),
                    reason: "refused".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                FmlError::UpstreamTimeout {
                    url: "http://node".into(),
                    seconds: 30,
                },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                FmlError::InvalidUpstreamResponse {
                    url: "http://node".into(),
                    reason: "expected value".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (FmlError::ConfigError("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = ApiError::from(FmlError::ConfigError("secret path".into()));
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert!(!err.message.contains("secret"));
    }
}
