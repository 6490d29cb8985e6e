//! Error Types
//!
//! This module defines the error taxonomy shared across the crate.
//!
//! # Error Categories
//!
//! - `ApiError` - failures talking to the remote sync service
//! - `StoreError` - session persistence failures
//! - `SyncError` - controller-level failures surfaced to callers
//!
//! # Usage
//!
//! ```rust
//! use edusync::error::ApiError;
//!
//! let error = ApiError::service(503, "maintenance window");
//! assert_eq!(error.notification_text(), "maintenance window");
//! ```
//!
//! # Thread Safety
//!
//! All error types are `Send + Sync` and can be safely shared across task
//! boundaries.

use thiserror::Error;

/// Failures talking to the remote sync service.
#[derive(Debug, Error, Clone)]
pub enum ApiError {
    /// No response reached the client at all (connect failure, timeout).
    #[error("server unreachable")]
    Unreachable,

    /// The transport failed after a connection was established.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("service error ({status}): {message}")]
    Service {
        /// HTTP status code of the response
        status: u16,
        /// Structured body message if present, else the status text
        message: String,
    },
}

impl ApiError {
    /// Create a new service error
    pub fn service(status: u16, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            message: message.into(),
        }
    }

    /// Text shown to the user when a trigger attempt fails with this error.
    ///
    /// Structured body message wins; a request that never reached the server
    /// reads "server unreachable"; anything else falls back to the raw
    /// transport error text.
    pub fn notification_text(&self) -> String {
        match self {
            Self::Service { message, .. } => message.clone(),
            Self::Unreachable => "server unreachable".to_string(),
            Self::Transport(detail) => detail.clone(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        // Connect/timeout/request-build failures mean no response arrived.
        if err.is_connect() || err.is_timeout() || err.is_request() {
            Self::Unreachable
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Session persistence failures. Corrupt stored data is never an error; it
/// reads as an absent session.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write session: {0}")]
    Write(#[from] std::io::Error),

    #[error("failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Controller-level failures surfaced by [`request_sync`].
///
/// [`request_sync`]: crate::session::SyncController::request_sync
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The readiness check came back negative; no trigger call was made.
    #[error("server not ready for synchronization")]
    ReadinessNotMet,

    /// A cool-down is already in progress; a new attempt is not offered.
    #[error("a synchronization cool-down is already in progress")]
    CooldownActive,

    #[error(transparent)]
    Store(#[from] StoreError),
}
