//! API Module
//!
//! HTTP handlers and routing for the tool-call API.
//!
//! # Endpoints
//! - `POST /tools/:name` - Invoke a tool with JSON arguments
//! - `GET /tools` - List available tools
//! - `DELETE /cache` - Clear the response cache
//! - `GET /stats` - Cache and rate limiter statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use middleware::{CLIENT_ID_HEADER, REMAINING_HEADER};
pub use routes::create_router;
