//! Request and Response models for the tool-call API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! parsing tool invocations and serializing HTTP response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ToolCall, TOOL_NAMES};
pub use responses::{
    ClearCacheResponse, ErrorResponse, HealthResponse, StatsResponse, ToolContent,
    ToolListResponse, ToolResponse,
};
