//! Response DTOs for the tool-call API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

/// One item of a tool result's content list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolContent {
    /// Content type, always "text" for JSON payloads
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// Content envelope wrapping a successful tool result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResponse {
    pub content: Vec<ToolContent>,
}

impl ToolResponse {
    /// Wraps a JSON value as compact text content.
    pub fn json(value: &Value) -> Self {
        Self {
            content: vec![ToolContent {
                kind: "text".to_string(),
                text: value.to_string(),
            }],
        }
    }
}

/// Response body for the tool listing (GET /tools)
#[derive(Debug, Clone, Serialize)]
pub struct ToolListResponse {
    pub tools: Vec<&'static str>,
}

/// Response body for the cache reset (DELETE /cache)
#[derive(Debug, Clone, Serialize)]
pub struct ClearCacheResponse {
    /// Success message
    pub message: String,
    /// Number of entries dropped
    pub removed: usize,
}

impl ClearCacheResponse {
    pub fn new(removed: usize) -> Self {
        Self {
            message: "Cache cleared successfully".to_string(),
            removed,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of entries removed after expiring
    pub expired: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Clients currently tracked by the rate limiter
    pub tracked_clients: usize,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
    /// Machine-readable error category
    pub kind: &'static str,
    /// HTTP status returned by the upstream API, for fetch failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_response_envelope() {
        let resp = ToolResponse::json(&json!({"temp": 25}));
        let value = serde_json::to_value(&resp).unwrap();

        assert_eq!(
            value,
            json!({"content": [{"type": "text", "text": "{\"temp\":25}"}]})
        );
    }

    #[test]
    fn test_clear_cache_response_serialize() {
        let json = serde_json::to_string(&ClearCacheResponse::new(3)).unwrap();
        assert!(json.contains("Cache cleared successfully"));
        assert!(json.contains("\"removed\":3"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_omits_missing_upstream_status() {
        let resp = ErrorResponse {
            error: "Client ID is required".to_string(),
            kind: "missing_client_id",
            upstream_status: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("upstream_status"));
    }
}
