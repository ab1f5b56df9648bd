//! F1 Data Service
//!
//! Fetch-with-cache access to the OpenF1 and Ergast APIs.
//!
//! Every operation builds the upstream URL, consults the shared cache under
//! that URL, and only on a miss calls the fetcher. Successful responses are
//! stored with a TTL that depends on the tool and on how volatile its data
//! is; failures are never stored. The cache lock is released before the
//! fetch is awaited, so two concurrent misses for the same URL both reach the
//! upstream and the later `set` wins.

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Url;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{SharedCache, TtlCache};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::{F1Error, Result};
use crate::upstream::Fetcher;

/// Season list size used when the caller gives no limit.
pub const DEFAULT_SEASON_LIMIT: u32 = 100;

// == Upstream URLs ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamUrls {
    /// OpenF1 base URL (live and recent session data)
    pub openf1: String,
    /// Ergast base URL (historic results and reference data)
    pub ergast: String,
}

impl Default for UpstreamUrls {
    fn default() -> Self {
        Self {
            openf1: "https://api.openf1.org/v1".to_string(),
            ergast: "http://ergast.com/api/f1".to_string(),
        }
    }
}

// == TTL Policy ==
/// Cache lifetimes in seconds.
///
/// A per-tool override wins over the volatility class of the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlPolicy {
    /// Timing, weather, telemetry, race control
    pub live: u64,
    /// Everything else; `None` defers to the cache's default TTL
    pub static_data: Option<u64>,
    /// Tool name to TTL, e.g. `getLapTimes` => 3600
    pub overrides: HashMap<String, u64>,
}

impl TtlPolicy {
    fn ttl_for(&self, op: &Operation) -> Option<u64> {
        if let Some(&ttl) = self.overrides.get(op.tool) {
            return Some(ttl);
        }
        match op.freshness {
            Freshness::Live => Some(self.live),
            Freshness::Static => self.static_data,
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            live: 10,
            static_data: None,
            overrides: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Freshness {
    Live,
    Static,
}

/// What a data operation is called and how its results are cached.
#[derive(Debug, Clone, Copy)]
struct Operation {
    tool: &'static str,
    freshness: Freshness,
    /// Prefix of the upstream error message
    context: &'static str,
}

impl Operation {
    const fn live(tool: &'static str, context: &'static str) -> Self {
        Self {
            tool,
            freshness: Freshness::Live,
            context,
        }
    }

    const fn fixed(tool: &'static str, context: &'static str) -> Self {
        Self {
            tool,
            freshness: Freshness::Static,
            context,
        }
    }
}

// == F1 Data Service ==
/// Explicitly constructed data service shared by all tool calls.
pub struct F1DataService {
    fetcher: Arc<dyn Fetcher>,
    cache: SharedCache<Value>,
    urls: UpstreamUrls,
    ttls: TtlPolicy,
}

impl F1DataService {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        cache: SharedCache<Value>,
        urls: UpstreamUrls,
        ttls: TtlPolicy,
    ) -> Self {
        Self {
            fetcher,
            cache,
            urls,
            ttls,
        }
    }

    /// Builds the service and its cache from configuration.
    pub fn from_config(config: &Config, fetcher: Arc<dyn Fetcher>, clock: Arc<dyn Clock>) -> Self {
        let cache = Arc::new(RwLock::new(TtlCache::new(config.cache_options(), clock)));
        Self::new(fetcher, cache, config.upstream_urls(), config.ttl_policy())
    }

    /// Handle to the response cache, for the reaper and statistics.
    pub fn cache(&self) -> SharedCache<Value> {
        self.cache.clone()
    }

    // == Clear Cache ==
    /// Drops every cached response. Returns the number removed.
    pub async fn clear_cache(&self) -> usize {
        let removed = self.cache.write().await.clear();
        debug!("Cache cleared ({} entries)", removed);
        removed
    }

    // == Fetch With Cache ==
    /// Returns the cached document for `url`, fetching and storing it on a
    /// miss.
    async fn fetch_cached(&self, url: String, op: Operation) -> Result<Value> {
        let cached = {
            let mut cache = self.cache.write().await;
            cache.get(&url)
        };
        if let Some(value) = cached {
            debug!("Cache hit for key: {}", url);
            return Ok(value);
        }

        debug!("Cache miss for key: {}", url);
        let value = self.fetcher.fetch_json(&url).await.map_err(|e| {
            warn!("{} ({}): {}", op.context, url, e);
            e.with_context(op.context)
        })?;

        let ttl = self.ttls.ttl_for(&op);
        {
            let mut cache = self.cache.write().await;
            cache.set(&url, value.clone(), ttl);
        }
        debug!("Cached {} result for key: {}", op.tool, url);

        Ok(value)
    }

    fn openf1(&self, resource: &str, params: &[(&str, Option<&str>)]) -> Result<String> {
        endpoint(&self.urls.openf1, &[resource], params).map(String::from)
    }

    fn ergast(&self, segments: &[&str]) -> Result<String> {
        endpoint(&self.urls.ergast, segments, &[]).map(String::from)
    }

    // == OpenF1 Operations ==

    pub async fn live_timing(&self) -> Result<Value> {
        const OP: Operation =
            Operation::live("getLiveTimingData", "Failed to fetch live timing data");
        self.fetch_cached(self.openf1("live_timing", &[])?, OP).await
    }

    pub async fn session_status(&self) -> Result<Value> {
        const OP: Operation =
            Operation::live("getCurrentSessionStatus", "Failed to fetch session status");
        self.fetch_cached(self.openf1("session_status", &[])?, OP).await
    }

    pub async fn driver_info(&self, driver_id: &str) -> Result<Value> {
        const OP: Operation = Operation::fixed("getDriverInfo", "Failed to fetch driver info");
        let url = self.openf1("drivers", &[("driver_number", Some(driver_id))])?;
        self.fetch_cached(url, OP).await
    }

    pub async fn weather(&self, session_key: Option<&str>) -> Result<Value> {
        const OP: Operation = Operation::live("getWeatherData", "Failed to fetch weather data");
        let url = self.openf1("weather", &[("session_key", session_key)])?;
        self.fetch_cached(url, OP).await
    }

    /// Car telemetry. `filters` is appended verbatim as extra query terms,
    /// e.g. `speed>=315`.
    pub async fn car_data(
        &self,
        driver_number: &str,
        session_key: Option<&str>,
        filters: Option<&str>,
    ) -> Result<Value> {
        const OP: Operation =
            Operation::live("getCarData", "Failed to fetch car telemetry data");
        let mut url = self.openf1(
            "car_data",
            &[
                ("driver_number", Some(driver_number)),
                ("session_key", session_key),
            ],
        )?;
        if let Some(filters) = filters.filter(|f| !f.is_empty()) {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(filters);
        }
        self.fetch_cached(url, OP).await
    }

    pub async fn pit_stops(
        &self,
        session_key: Option<&str>,
        driver_number: Option<&str>,
    ) -> Result<Value> {
        const OP: Operation =
            Operation::fixed("getPitStopData", "Failed to fetch pit stop data");
        let url = self.openf1(
            "pit",
            &[("session_key", session_key), ("driver_number", driver_number)],
        )?;
        self.fetch_cached(url, OP).await
    }

    pub async fn team_radio(
        &self,
        session_key: Option<&str>,
        driver_number: Option<&str>,
    ) -> Result<Value> {
        const OP: Operation =
            Operation::fixed("getTeamRadio", "Failed to fetch team radio data");
        let url = self.openf1(
            "team_radio",
            &[("session_key", session_key), ("driver_number", driver_number)],
        )?;
        self.fetch_cached(url, OP).await
    }

    pub async fn race_control(&self, session_key: Option<&str>) -> Result<Value> {
        const OP: Operation = Operation::live(
            "getRaceControlMessages",
            "Failed to fetch race control messages",
        );
        let url = self.openf1("race_control", &[("session_key", session_key)])?;
        self.fetch_cached(url, OP).await
    }

    // == Ergast Operations ==

    pub async fn race_results(&self, year: u32, round: u32) -> Result<Value> {
        const OP: Operation = Operation::fixed(
            "getHistoricRaceResults",
            "Failed to fetch historic race results",
        );
        let (year, round) = (year.to_string(), round.to_string());
        let url = self.ergast(&[year.as_str(), round.as_str(), "results.json"])?;
        let data = self.fetch_cached(url, OP).await?;
        select(&data, "/MRData/RaceTable/Races/0", "race results")
    }

    pub async fn driver_standings(&self, year: u32) -> Result<Value> {
        const OP: Operation =
            Operation::fixed("getDriverStandings", "Failed to fetch driver standings");
        let url = self.ergast(&[year.to_string().as_str(), "driverStandings.json"])?;
        let data = self.fetch_cached(url, OP).await?;
        select(
            &data,
            "/MRData/StandingsTable/StandingsLists/0",
            "driver standings",
        )
    }

    pub async fn constructor_standings(&self, year: u32) -> Result<Value> {
        const OP: Operation = Operation::fixed(
            "getConstructorStandings",
            "Failed to fetch constructor standings",
        );
        let url = self.ergast(&[year.to_string().as_str(), "constructorStandings.json"])?;
        let data = self.fetch_cached(url, OP).await?;
        select(
            &data,
            "/MRData/StandingsTable/StandingsLists/0",
            "constructor standings",
        )
    }

    pub async fn lap_times(&self, year: u32, round: u32, driver_id: &str) -> Result<Value> {
        const OP: Operation = Operation::fixed("getLapTimes", "Failed to fetch lap times");
        let (year, round) = (year.to_string(), round.to_string());
        let url = self.ergast(&[year.as_str(), round.as_str(), "drivers", driver_id, "laps.json"])?;
        let data = self.fetch_cached(url, OP).await?;
        select(&data, "/MRData/RaceTable/Races/0", "lap times")
    }

    pub async fn race_calendar(&self, year: u32) -> Result<Value> {
        const OP: Operation =
            Operation::fixed("getRaceCalendar", "Failed to fetch race calendar");
        let url = self.ergast(&[format!("{}.json", year).as_str()])?;
        let data = self.fetch_cached(url, OP).await?;
        select(&data, "/MRData/RaceTable/Races", "race calendar")
    }

    pub async fn circuit_info(&self, circuit_id: &str) -> Result<Value> {
        const OP: Operation =
            Operation::fixed("getCircuitInfo", "Failed to fetch circuit information");
        let url = self.ergast(&["circuits", format!("{}.json", circuit_id).as_str()])?;
        let data = self.fetch_cached(url, OP).await?;
        select(&data, "/MRData/CircuitTable/Circuits/0", "circuit")
    }

    pub async fn seasons(&self, limit: Option<u32>) -> Result<Value> {
        const OP: Operation = Operation::fixed("getSeasonList", "Failed to fetch season list");
        let limit = limit.unwrap_or(DEFAULT_SEASON_LIMIT).to_string();
        let url = endpoint(
            &self.urls.ergast,
            &["seasons.json"],
            &[("limit", Some(limit.as_str()))],
        )?;
        let data = self.fetch_cached(url.into(), OP).await?;
        select(&data, "/MRData/SeasonTable/Seasons", "season list")
    }

    pub async fn qualifying_results(&self, year: u32, round: u32) -> Result<Value> {
        const OP: Operation =
            Operation::fixed("getQualifyingResults", "Failed to fetch qualifying results");
        let (year, round) = (year.to_string(), round.to_string());
        let url = self.ergast(&[year.as_str(), round.as_str(), "qualifying.json"])?;
        let data = self.fetch_cached(url, OP).await?;
        select(&data, "/MRData/RaceTable/Races/0", "qualifying results")
    }

    pub async fn driver_information(&self, driver_id: &str) -> Result<Value> {
        const OP: Operation =
            Operation::fixed("getDriverInformation", "Failed to fetch driver information");
        let url = self.ergast(&["drivers", format!("{}.json", driver_id).as_str()])?;
        let data = self.fetch_cached(url, OP).await?;
        select(&data, "/MRData/DriverTable/Drivers/0", "driver")
    }

    pub async fn constructor_information(&self, constructor_id: &str) -> Result<Value> {
        const OP: Operation = Operation::fixed(
            "getConstructorInformation",
            "Failed to fetch constructor information",
        );
        let url = self.ergast(&["constructors", format!("{}.json", constructor_id).as_str()])?;
        let data = self.fetch_cached(url, OP).await?;
        select(
            &data,
            "/MRData/ConstructorTable/Constructors/0",
            "constructor",
        )
    }
}

/// Builds `base/segment/...?name=value&...` with every segment and value
/// percent-encoded. Absent or empty parameters are left out.
fn endpoint(base: &str, segments: &[&str], params: &[(&str, Option<&str>)]) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| F1Error::Internal(format!("invalid upstream URL {}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| F1Error::Internal(format!("upstream URL {} cannot take a path", base)))?
        .pop_if_empty()
        .extend(segments);

    let present: Vec<(&str, &str)> = params
        .iter()
        .filter_map(|&(name, value)| value.filter(|v| !v.is_empty()).map(|v| (name, v)))
        .collect();
    if !present.is_empty() {
        url.query_pairs_mut().extend_pairs(present);
    }

    Ok(url)
}

/// Extracts the part of an upstream document an operation returns.
fn select(data: &Value, pointer: &str, what: &str) -> Result<Value> {
    data.pointer(pointer).cloned().ok_or_else(|| {
        warn!("Upstream payload has no {} at {}", what, pointer);
        F1Error::MalformedPayload(format!("no {} found at {}", what, pointer))
    })
}
