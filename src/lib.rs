//! F1 MCP Server - Formula 1 data tools over HTTP
//!
//! Serves live timing, historic results and telemetry from the OpenF1 and
//! Ergast APIs, with a TTL response cache and per-client rate limiting.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod service;
pub mod tasks;
pub mod upstream;

pub use api::AppState;
pub use config::Config;
pub use error::{F1Error, Result};
pub use service::F1DataService;
pub use tasks::spawn_reaper;
