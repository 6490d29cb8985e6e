//! Notification sink seam.
//!
//! The controller reports outcomes through a fire-and-forget sink; the
//! console renders them, tests record them.

use tracing::{error, info};

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
    Info,
}

/// Receives transient user-facing messages. Implementations must not block
/// and must not fail.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, message: &str, level: Level);
}

/// Sink that routes notifications onto the tracing pipeline.
#[derive(Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, message: &str, level: Level) {
        match level {
            Level::Success => info!(target: "edusync::notify", "{message}"),
            Level::Error => error!(target: "edusync::notify", "{message}"),
            Level::Info => info!(target: "edusync::notify", "{message}"),
        }
    }
}
