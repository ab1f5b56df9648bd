//! Rate Limit Middleware
//!
//! Identifies the caller from the `x-client-id` header and applies the
//! per-client rate limit before the request reaches any handler.

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::handlers::AppState;
use crate::error::{F1Error, Result};
use crate::rate_limit::{ClientId, RateLimitDecision};

/// Header carrying the opaque client identifier.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Header reporting requests left in the current window.
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Rejects requests without a client id (400) or over quota (429).
///
/// On success the `ClientId` is stored in the request extensions for
/// handlers to use.
pub async fn rate_limit(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let raw = request
        .headers()
        .get(CLIENT_ID_HEADER)
        .and_then(|value| value.to_str().ok());
    let client = ClientId::parse(raw).inspect_err(|_| {
        warn!("Rejected {} without a client ID", request.uri().path());
    })?;

    let decision = {
        let mut limiter = state.limiter.write().await;
        limiter.check_and_record(&client)
    };

    match decision {
        RateLimitDecision::Allowed { remaining } => {
            request.extensions_mut().insert(client);
            let mut response = next.run(request).await;
            response
                .headers_mut()
                .insert(REMAINING_HEADER, HeaderValue::from(remaining));
            Ok(response)
        }
        RateLimitDecision::Denied { retry_after_ms } => {
            Err(F1Error::RateLimitExceeded { retry_after_ms })
        }
    }
}
