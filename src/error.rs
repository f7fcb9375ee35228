//! Error types for the tracking engine.
//!
//! Nothing in this crate is fatal to the process: every failure path
//! degrades a specific derived field to "absent" rather than propagating.
//! The variants here exist so collaborators (persistence, external lookup,
//! sensor adapters) can report structured causes and so callers can decide
//! whether a retry makes sense.
//!
//! ## Error Categories
//!
//! - **Parse Errors**: malformed time-of-day strings or persisted state
//! - **Schedule Errors**: invalid activity windows or duplicate ids
//! - **Sensor Errors**: geolocation/orientation adapter failures
//! - **Lookup Errors**: external place-search failures (always non-fatal)
//! - **Store Errors**: completion-state persistence I/O
//! - **Waypoint Form Errors**: rejected waypoint confirmation input

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tracking operations.
pub type Result<T, E = TrackingError> = std::result::Result<T, E>;

/// Main error type for the tracking engine.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TrackingError {
    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Invalid schedule: {reason}")]
    Schedule { reason: String },

    #[error("Sensor failure: {reason}")]
    Sensor {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("External place lookup failed: {reason}")]
    Lookup {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Completion store error: {path}")]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Waypoint form rejected: {reason}")]
    WaypointForm { reason: String },
}

impl TrackingError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            TrackingError::Sensor { .. } => true,
            TrackingError::Lookup { .. } => true,
            TrackingError::Store { .. } => true,
            TrackingError::Parse { .. } => false,
            TrackingError::Schedule { .. } => false,
            TrackingError::WaypointForm { .. } => false,
        }
    }

    /// Create a parse error with context.
    pub fn parse(context: impl Into<String>, details: impl Into<String>) -> Self {
        TrackingError::Parse { context: context.into(), details: details.into() }
    }

    /// Create a schedule validation error.
    pub fn schedule(reason: impl Into<String>) -> Self {
        TrackingError::Schedule { reason: reason.into() }
    }

    /// Create a sensor error without an underlying source.
    pub fn sensor(reason: impl Into<String>) -> Self {
        TrackingError::Sensor { reason: reason.into(), source: None }
    }

    /// Create an external lookup error without an underlying source.
    pub fn lookup(reason: impl Into<String>) -> Self {
        TrackingError::Lookup { reason: reason.into(), source: None }
    }

    /// Create a lookup error wrapping an underlying cause.
    pub fn lookup_with_source(
        reason: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        TrackingError::Lookup { reason: reason.into(), source: Some(Box::new(source)) }
    }

    /// Create a store error for a path.
    pub fn store(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TrackingError::Store { path: path.into(), source }
    }

    /// Create a waypoint form rejection.
    pub fn waypoint_form(reason: impl Into<String>) -> Self {
        TrackingError::WaypointForm { reason: reason.into() }
    }
}
