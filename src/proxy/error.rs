//! Error types and response handling for the adapter.
//!
//! Every failure is scoped to one exchange and rendered as a JSON error
//! response; nothing here is fatal to the process.

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::Response;
use thiserror::Error;

/// Errors that can occur while relaying one request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Upstream target could not be combined with the request path
    #[error("Invalid target URL '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Inbound body could not be read
    #[error("Failed to read request body: {0}")]
    BodyRead(String),

    /// Inbound chat request is not valid JSON
    #[error("Failed to decode request: {0}")]
    MalformedRequest(#[source] serde_json::Error),

    /// Backend chat response is not valid JSON
    #[error("Failed to decode response: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    /// Rewritten body could not be encoded
    #[error("Failed to encode body: {0}")]
    Encode(#[source] serde_json::Error),

    /// Failed to connect to, or read from, the backend
    #[error("Connection failed to '{target}': {source}")]
    ConnectionError {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP error from response building
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<axum::http::Error> for ProxyError {
    fn from(err: axum::http::Error) -> Self {
        ProxyError::Http(err.to_string())
    }
}

impl ProxyError {
    /// Map error variant to appropriate HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::ConnectionError { .. } => StatusCode::BAD_GATEWAY,
            ProxyError::InvalidTarget { .. }
            | ProxyError::BodyRead(_)
            | ProxyError::MalformedRequest(_)
            | ProxyError::MalformedResponse(_)
            | ProxyError::Encode(_)
            | ProxyError::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error type string for JSON responses
    pub fn error_type(&self) -> &'static str {
        match self {
            ProxyError::InvalidTarget { .. } => "invalid_target",
            ProxyError::BodyRead(_) => "body_read_error",
            ProxyError::MalformedRequest(_) => "malformed_request",
            ProxyError::MalformedResponse(_) => "malformed_response",
            ProxyError::Encode(_) => "encode_error",
            ProxyError::ConnectionError { .. } => "connection_error",
            ProxyError::Http(_) => "http_error",
        }
    }
}

/// Builder for standardized error responses
pub struct ErrorResponse;

impl ErrorResponse {
    /// Create a JSON error response from a ProxyError
    pub fn from_error(err: &ProxyError, request_id: &str) -> Response {
        let body = serde_json::json!({
            "error": {
                "type": err.error_type(),
                "message": err.to_string(),
                "request_id": request_id
            }
        });

        let mut response = Response::new(Body::from(body.to_string()));
        *response.status_mut() = err.status_code();
        response.headers_mut().insert(
            CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/json"),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("{not json").unwrap_err()
    }

    #[test]
    fn test_malformed_request_status_code() {
        let err = ProxyError::MalformedRequest(decode_error());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_type(), "malformed_request");
    }

    #[test]
    fn test_malformed_response_status_code() {
        let err = ProxyError::MalformedResponse(decode_error());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().starts_with("Failed to decode response"));
    }

    #[test]
    fn test_error_response_format() {
        let err = ProxyError::InvalidTarget {
            target: "::".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        let response = ErrorResponse::from_error(&err, "test-id-123");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/json"
        );
    }
}
