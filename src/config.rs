//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::cache::CacheOptions;
use crate::models::TOOL_NAMES;
use crate::rate_limit::RateLimitConfig;
use crate::service::{TtlPolicy, UpstreamUrls};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Default TTL in seconds for cache entries without explicit TTL
    pub default_ttl: u64,
    /// TTL in seconds for live session data
    pub live_ttl: u64,
    /// TTL in seconds for historic and reference data, None = `default_ttl`
    pub static_ttl: Option<u64>,
    /// Per-tool TTLs in seconds, taking precedence over the two above
    pub ttl_overrides: HashMap<String, u64>,
    /// Prefix applied to every cache key
    pub key_prefix: String,
    /// Rate limit window in milliseconds
    pub rate_limit_window_ms: u64,
    /// Requests allowed per client per window
    pub rate_limit_max_requests: u32,
    /// Interval between reaper sweeps in milliseconds
    pub reaper_interval_ms: u64,
    pub openf1_base_url: String,
    pub ergast_base_url: String,
    /// Per-request upstream timeout in seconds
    pub upstream_timeout_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CACHE_LIVE_TTL` - Live data TTL in seconds (default: 10)
    /// - `CACHE_STATIC_TTL` - Historic data TTL in seconds (default: unset)
    /// - `CACHE_TTL_OVERRIDES` - Per-tool TTLs, e.g. `getLapTimes=3600,getWeatherData=30`
    /// - `CACHE_KEY_PREFIX` - Cache key prefix (default: "mcp:")
    /// - `RATE_LIMIT_WINDOW_MS` - Window length (default: 60000)
    /// - `RATE_LIMIT_MAX_REQUESTS` - Requests per window (default: 60)
    /// - `REAPER_INTERVAL_MS` - Sweep frequency (default: 60000)
    /// - `OPENF1_BASE_URL`, `ERGAST_BASE_URL` - Upstream API roots
    /// - `UPSTREAM_TIMEOUT_SECS` - Upstream request timeout (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            default_ttl: env_or("CACHE_DEFAULT_TTL", defaults.default_ttl),
            live_ttl: env_or("CACHE_LIVE_TTL", defaults.live_ttl),
            static_ttl: env_parse("CACHE_STATIC_TTL").or(defaults.static_ttl),
            ttl_overrides: env::var("CACHE_TTL_OVERRIDES")
                .map(|raw| parse_ttl_overrides(&raw))
                .unwrap_or(defaults.ttl_overrides),
            key_prefix: env::var("CACHE_KEY_PREFIX").unwrap_or(defaults.key_prefix),
            rate_limit_window_ms: env_or("RATE_LIMIT_WINDOW_MS", defaults.rate_limit_window_ms),
            rate_limit_max_requests: env_or(
                "RATE_LIMIT_MAX_REQUESTS",
                defaults.rate_limit_max_requests,
            ),
            reaper_interval_ms: env_or("REAPER_INTERVAL_MS", defaults.reaper_interval_ms),
            openf1_base_url: env::var("OPENF1_BASE_URL").unwrap_or(defaults.openf1_base_url),
            ergast_base_url: env::var("ERGAST_BASE_URL").unwrap_or(defaults.ergast_base_url),
            upstream_timeout_secs: env_or("UPSTREAM_TIMEOUT_SECS", defaults.upstream_timeout_secs),
        }
    }

    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            default_ttl: self.default_ttl,
            key_prefix: self.key_prefix.clone(),
        }
    }

    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            window_ms: self.rate_limit_window_ms,
            max_requests: self.rate_limit_max_requests,
        }
    }

    pub fn ttl_policy(&self) -> TtlPolicy {
        TtlPolicy {
            live: self.live_ttl,
            static_data: self.static_ttl,
            overrides: self.ttl_overrides.clone(),
        }
    }

    pub fn upstream_urls(&self) -> UpstreamUrls {
        UpstreamUrls {
            openf1: self.openf1_base_url.trim_end_matches('/').to_string(),
            ergast: self.ergast_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn reaper_interval(&self) -> Duration {
        Duration::from_millis(self.reaper_interval_ms)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        let urls = UpstreamUrls::default();
        let cache = CacheOptions::default();
        let rate_limit = RateLimitConfig::default();
        let ttls = TtlPolicy::default();

        Self {
            server_port: 3000,
            default_ttl: cache.default_ttl,
            live_ttl: ttls.live,
            static_ttl: ttls.static_data,
            ttl_overrides: ttls.overrides,
            key_prefix: cache.key_prefix,
            rate_limit_window_ms: rate_limit.window_ms,
            rate_limit_max_requests: rate_limit.max_requests,
            reaper_interval_ms: 60_000,
            openf1_base_url: urls.openf1,
            ergast_base_url: urls.ergast,
            upstream_timeout_secs: 10,
        }
    }
}

/// Parses `tool=seconds` pairs separated by commas.
///
/// Unknown tool names and unparseable seconds are skipped with a warning.
fn parse_ttl_overrides(raw: &str) -> HashMap<String, u64> {
    let mut overrides = HashMap::new();

    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((tool, ttl)) = pair.split_once('=') else {
            warn!("Ignoring TTL override without '=': {}", pair);
            continue;
        };
        let tool = tool.trim();
        if !TOOL_NAMES.contains(&tool) {
            warn!("Ignoring TTL override for unknown tool: {}", tool);
            continue;
        }
        match ttl.trim().parse::<u64>() {
            Ok(ttl) => {
                overrides.insert(tool.to_string(), ttl);
            }
            Err(_) => warn!("Ignoring TTL override with bad seconds: {}", pair),
        }
    }

    overrides
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env_parse(name).unwrap_or(default)
}
