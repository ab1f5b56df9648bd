//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Reaper: sweeps expired cache entries and idle rate limit clients

mod cleanup;

pub use cleanup::{spawn_reaper, ReaperHandle, Sweep};
