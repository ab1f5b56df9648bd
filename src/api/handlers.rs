//! API Handlers
//!
//! HTTP request handlers for each tool server endpoint.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::Config;
use crate::error::{F1Error, Result};
use crate::models::{
    ClearCacheResponse, HealthResponse, StatsResponse, ToolCall, ToolListResponse, ToolResponse,
    TOOL_NAMES,
};
use crate::rate_limit::{ClientId, RateLimiter, SharedLimiter};
use crate::service::F1DataService;
use crate::upstream::Fetcher;

/// Application state shared across all handlers.
///
/// Holds the data service and the rate limiter; both are constructed once
/// at startup and passed in here rather than living in globals.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<F1DataService>,
    pub limiter: SharedLimiter,
}

impl AppState {
    pub fn new(service: F1DataService, limiter: RateLimiter) -> Self {
        Self {
            service: Arc::new(service),
            limiter: Arc::new(RwLock::new(limiter)),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config, fetcher: Arc<dyn Fetcher>, clock: Arc<dyn Clock>) -> Self {
        let service = F1DataService::from_config(config, fetcher, clock.clone());
        let limiter = RateLimiter::new(config.rate_limit(), clock);
        Self::new(service, limiter)
    }
}

/// Runs a parsed tool call against the data service.
pub async fn dispatch(service: &F1DataService, call: ToolCall) -> Result<Value> {
    match call {
        ToolCall::LiveTimingData => service.live_timing().await,
        ToolCall::CurrentSessionStatus => service.session_status().await,
        ToolCall::DriverInfo(args) => service.driver_info(&args.driver_id).await,
        ToolCall::HistoricRaceResults(args) => service.race_results(args.year, args.round).await,
        ToolCall::DriverStandings(args) => service.driver_standings(args.year).await,
        ToolCall::ConstructorStandings(args) => service.constructor_standings(args.year).await,
        ToolCall::LapTimes(args) => {
            service
                .lap_times(args.year, args.round, &args.driver_id)
                .await
        }
        ToolCall::WeatherData(args) => service.weather(args.session_key.as_deref()).await,
        ToolCall::CarData(args) => {
            service
                .car_data(
                    &args.driver_number,
                    args.session_key.as_deref(),
                    args.filters.as_deref(),
                )
                .await
        }
        ToolCall::PitStopData(args) => {
            service
                .pit_stops(args.session_key.as_deref(), args.driver_number.as_deref())
                .await
        }
        ToolCall::TeamRadio(args) => {
            service
                .team_radio(args.session_key.as_deref(), args.driver_number.as_deref())
                .await
        }
        ToolCall::RaceControlMessages(args) => {
            service.race_control(args.session_key.as_deref()).await
        }
        ToolCall::RaceCalendar(args) => service.race_calendar(args.year).await,
        ToolCall::CircuitInfo(args) => service.circuit_info(&args.circuit_id).await,
        ToolCall::SeasonList(args) => service.seasons(args.limit).await,
        ToolCall::QualifyingResults(args) => {
            service.qualifying_results(args.year, args.round).await
        }
        ToolCall::DriverInformation(args) => service.driver_information(&args.driver_id).await,
        ToolCall::ConstructorInformation(args) => {
            service.constructor_information(&args.constructor_id).await
        }
        ToolCall::ClearCache => {
            service.clear_cache().await;
            Ok(json!({ "message": "Cache cleared successfully" }))
        }
    }
}

/// Handler for POST /tools/:name
///
/// The body is the tool's JSON arguments; an empty body means no arguments.
pub async fn call_tool_handler(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<ToolResponse>> {
    let args = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| F1Error::InvalidParams(format!("{}: {}", name, e)))?
    };

    let call = ToolCall::parse(&name, args)?;
    debug!("Client {} calling {}", client, name);

    let value = dispatch(&state.service, call).await?;
    Ok(Json(ToolResponse::json(&value)))
}

/// Handler for GET /tools
pub async fn list_tools_handler() -> Json<ToolListResponse> {
    Json(ToolListResponse {
        tools: TOOL_NAMES.to_vec(),
    })
}

/// Handler for DELETE /cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearCacheResponse> {
    let removed = state.service.clear_cache().await;
    info!("Cache cleared by admin request ({} entries)", removed);
    Json(ClearCacheResponse::new(removed))
}

/// Handler for GET /stats
///
/// Returns cache statistics and the number of rate limited clients.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.service.cache().read().await.stats();
    let tracked_clients = state.limiter.read().await.len();

    Json(StatsResponse {
        hits: stats.hits,
        misses: stats.misses,
        expired: stats.expired,
        total_entries: stats.total_entries,
        hit_rate: stats.hit_rate(),
        tracked_clients,
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns the same document for every URL.
    struct FixedFetcher {
        body: Value,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Fetcher for FixedFetcher {
        async fn fetch_json(&self, _url: &str) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.clone())
        }
    }

    fn state_with(body: Value) -> (AppState, Arc<FixedFetcher>) {
        let fetcher = Arc::new(FixedFetcher {
            body,
            calls: AtomicUsize::new(0),
        });
        let state = AppState::from_config(
            &Config::default(),
            fetcher.clone(),
            Arc::new(ManualClock::new(0)),
        );
        (state, fetcher)
    }

    fn client() -> Extension<ClientId> {
        Extension(ClientId::parse(Some("test-client")).unwrap())
    }

    #[tokio::test]
    async fn test_call_tool_wraps_result() {
        let (state, _) = state_with(json!([{"air_temperature": 25.1}]));

        let response = call_tool_handler(
            State(state),
            client(),
            Path("getWeatherData".to_string()),
            Bytes::new(),
        )
        .await
        .unwrap();

        assert_eq!(response.content.len(), 1);
        assert_eq!(response.content[0].kind, "text");
        assert_eq!(response.content[0].text, r#"[{"air_temperature":25.1}]"#);
    }

    #[tokio::test]
    async fn test_call_tool_rejects_bad_json() {
        let (state, fetcher) = state_with(json!([]));

        let result = call_tool_handler(
            State(state),
            client(),
            Path("getDriverInfo".to_string()),
            Bytes::from_static(b"{not json"),
        )
        .await;

        assert!(matches!(result, Err(F1Error::InvalidParams(_))));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_clear_cache_tool_acknowledges() {
        let (state, fetcher) = state_with(json!([]));

        dispatch(&state.service, ToolCall::LiveTimingData)
            .await
            .unwrap();
        let ack = dispatch(&state.service, ToolCall::ClearCache).await.unwrap();
        dispatch(&state.service, ToolCall::LiveTimingData)
            .await
            .unwrap();

        assert_eq!(ack, json!({"message": "Cache cleared successfully"}));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let (state, _) = state_with(json!([]));

        dispatch(&state.service, ToolCall::LiveTimingData)
            .await
            .unwrap();
        dispatch(&state.service, ToolCall::LiveTimingData)
            .await
            .unwrap();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 1);
        assert_eq!(response.misses, 1);
        assert_eq!(response.total_entries, 1);
        assert_eq!(response.tracked_clients, 0);
    }

    #[tokio::test]
    async fn test_list_tools_handler() {
        let response = list_tools_handler().await;
        assert_eq!(response.tools.len(), TOOL_NAMES.len());
        assert!(response.tools.contains(&"clearCache"));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
