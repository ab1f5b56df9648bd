//! Error types for the F1 data server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == F1 Error Enum ==
/// Unified error type for the F1 data server.
#[derive(Error, Debug)]
pub enum F1Error {
    /// The upstream request failed or returned a non-success status
    #[error("{context}: {message}")]
    Upstream {
        /// What the caller was trying to fetch
        context: String,
        /// HTTP status returned by the upstream API, if any
        status: Option<u16>,
        message: String,
    },

    /// The upstream response did not have the expected shape
    #[error("Malformed upstream payload: {0}")]
    MalformedPayload(String),

    /// The request carried no client identifier
    #[error("Client ID is required")]
    MissingClientId,

    /// The client used up its quota for the current window
    #[error("Rate limit exceeded")]
    RateLimitExceeded {
        /// Milliseconds until the window rolls over
        retry_after_ms: u64,
    },

    /// Tool arguments were missing or of the wrong shape
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// No tool is registered under the requested name
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl F1Error {
    // == Upstream Constructor ==
    /// Builds an `Upstream` error without caller context yet.
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        F1Error::Upstream {
            context: "Upstream request failed".to_string(),
            status,
            message: message.into(),
        }
    }

    // == With Context ==
    /// Replaces the context of an `Upstream` error; other variants pass
    /// through unchanged.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        match self {
            F1Error::Upstream {
                status, message, ..
            } => F1Error::Upstream {
                context: context.into(),
                status,
                message,
            },
            other => other,
        }
    }

    // == Kind ==
    /// Stable, machine-readable error category.
    pub fn kind(&self) -> &'static str {
        match self {
            F1Error::Upstream { .. } => "upstream_fetch_failed",
            F1Error::MalformedPayload(_) => "malformed_upstream_payload",
            F1Error::MissingClientId => "missing_client_id",
            F1Error::RateLimitExceeded { .. } => "rate_limit_exceeded",
            F1Error::InvalidParams(_) => "invalid_params",
            F1Error::UnknownTool(_) => "unknown_tool",
            F1Error::Internal(_) => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            F1Error::Upstream { .. } => StatusCode::BAD_GATEWAY,
            F1Error::MalformedPayload(_) => StatusCode::INTERNAL_SERVER_ERROR,
            F1Error::MissingClientId => StatusCode::BAD_REQUEST,
            F1Error::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            F1Error::InvalidParams(_) => StatusCode::BAD_REQUEST,
            F1Error::UnknownTool(_) => StatusCode::NOT_FOUND,
            F1Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for F1Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let upstream_status = match &self {
            F1Error::Upstream { status, .. } => *status,
            _ => None,
        };
        let body = ErrorResponse {
            error: self.to_string(),
            kind: self.kind(),
            upstream_status,
        };

        let mut response = (status, Json(body)).into_response();

        if let F1Error::RateLimitExceeded { retry_after_ms } = self {
            let secs = retry_after_ms.div_ceil(1000).max(1);
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }

        response
    }
}

// == Result Type Alias ==
/// Convenience Result type for the F1 data server.
pub type Result<T> = std::result::Result<T, F1Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_are_distinct() {
        let missing = F1Error::MissingClientId;
        let limited = F1Error::RateLimitExceeded {
            retry_after_ms: 1_000,
        };

        assert_ne!(missing.kind(), limited.kind());
        assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(limited.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_with_context_keeps_status() {
        let err = F1Error::upstream(Some(503), "service unavailable")
            .with_context("Failed to fetch weather data");

        assert_eq!(
            err.to_string(),
            "Failed to fetch weather data: service unavailable"
        );
        assert!(matches!(
            err,
            F1Error::Upstream {
                status: Some(503),
                ..
            }
        ));
    }

    #[test]
    fn test_with_context_ignores_other_variants() {
        let err = F1Error::MalformedPayload("x".into()).with_context("ctx");
        assert!(matches!(err, F1Error::MalformedPayload(_)));
    }

    #[test]
    fn test_rate_limit_response_has_retry_after() {
        let response = F1Error::RateLimitExceeded {
            retry_after_ms: 1_500,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "2");
    }
}
