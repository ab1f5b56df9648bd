//! Upstream Module
//!
//! Fetches JSON documents from the upstream F1 REST APIs.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{F1Error, Result};

// == Fetcher Trait ==
/// Opaque upstream fetch: a fully formed URL in, parsed JSON out.
///
/// Implementations neither retry nor cache; both are the caller's concern.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_json(&self, url: &str) -> Result<Value>;
}

// == HTTP Fetcher ==
/// `Fetcher` backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Builds a client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("f1_mcp_server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| F1Error::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| F1Error::upstream(e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(F1Error::upstream(
                Some(status.as_u16()),
                format!("upstream returned {}", status),
            ));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| F1Error::upstream(Some(status.as_u16()), e.to_string()))
    }
}
