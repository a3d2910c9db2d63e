//! Error types for the locate TUI.
//!
//! Most failures in this application are recovered locally (an empty
//! candidate list, a missing live-position marker), so [`LocateError`] is
//! mainly used at the edges: loading config and quick links, persisting the
//! selection, and validating a location before the map is asked to fly to it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocateError {
    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON payload could not be parsed or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An HTTP request to a provider or static resource failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The location has no usable coordinates.
    ///
    /// Raised when a candidate or quick link is selected but its
    /// longitude/latitude are missing or outside the WGS84 range.
    #[error("Invalid location '{label}': {reason}")]
    InvalidLocation { label: String, reason: String },
}

pub type Result<T> = std::result::Result<T, LocateError>;
