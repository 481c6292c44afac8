//! Error types
//!
//! Nothing here is fatal: callers log these and fall back to the previous or
//! default state so the frame loop keeps running.

use thiserror::Error;

/// Storage read/write failures
#[derive(Error, Debug)]
pub enum PersistError {
    /// Filesystem error
    #[error("storage I/O failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Stored document could not be (de)serialized
    #[error("invalid JSON for '{key}': {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Backend not reachable (no window/localStorage, simulated failure)
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Rejected display resolution
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("invalid resolution {width}x{height}")]
pub struct ResolutionError {
    pub width: f32,
    pub height: f32,
}
