//! # Status Monitor
//!
//! Polls the synchronization status endpoint and normalizes whatever the
//! server reports onto a closed enum.
//!
//! ## Normalization precedence
//!
//! 1. Transport failure -> synthetic `Error` record ("status unavailable")
//! 2. Message carries an in-progress marker -> `InProgress`
//! 3. Message carries an unknown marker -> `Unknown`
//! 4. Otherwise the raw status field, mapped case-insensitively; anything
//!    outside the enum collapses to `Unknown`
//!
//! The free-text message outranks the status code: the server's code is
//! known to lag behind its message while a job is running, so the more
//! current textual signal wins when they disagree.

use crate::api::{StatusPayload, SyncClient};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

/// Marker substrings that flag an in-flight job inside the status message.
/// Matched case-insensitively; the message may otherwise be localized.
const IN_PROGRESS_MARKERS: &[&str] = &["in progress", "in_progress"];
/// Marker substring that flags an indeterminate outcome.
const UNKNOWN_MARKERS: &[&str] = &["unknown"];

/// Closed set of synchronization outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatusKind {
    Success,
    Error,
    InProgress,
    Unknown,
}

/// Map a raw server status/message pair onto [`SyncStatusKind`].
///
/// Pure and total: identical inputs always yield identical outputs.
pub fn normalize(raw_status: Option<&str>, message: &str) -> SyncStatusKind {
    let message = message.to_lowercase();
    if IN_PROGRESS_MARKERS.iter().any(|m| message.contains(m)) {
        return SyncStatusKind::InProgress;
    }
    if UNKNOWN_MARKERS.iter().any(|m| message.contains(m)) {
        return SyncStatusKind::Unknown;
    }
    match raw_status.map(str::to_lowercase).as_deref() {
        Some("success") => SyncStatusKind::Success,
        Some("error") => SyncStatusKind::Error,
        Some("in_progress" | "in-progress" | "in progress") => SyncStatusKind::InProgress,
        _ => SyncStatusKind::Unknown,
    }
}

/// Last known synchronization status, normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStatus {
    pub raw_status: String,
    pub normalized: SyncStatusKind,
    pub message: String,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub error_detail: Option<String>,
}

impl SyncStatus {
    /// Sentinel before the first fetch (and after a dismissal).
    pub fn unknown() -> Self {
        Self {
            raw_status: String::new(),
            normalized: SyncStatusKind::Unknown,
            message: String::new(),
            last_sync_at: None,
            error_detail: None,
        }
    }

    /// Build from a server payload.
    pub fn from_payload(payload: StatusPayload) -> Self {
        let normalized = normalize(payload.status.as_deref(), &payload.message);
        Self {
            raw_status: payload.status.unwrap_or_default(),
            normalized,
            message: payload.message,
            last_sync_at: payload.last_sync,
            error_detail: payload.error,
        }
    }

    /// Synthetic record for a status query that could not complete.
    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self {
            raw_status: String::new(),
            normalized: SyncStatusKind::Error,
            message: "status unavailable".to_string(),
            last_sync_at: None,
            error_detail: Some(detail.into()),
        }
    }
}

/// Periodic status poller.
pub struct StatusMonitor {
    client: SyncClient,
    current: Arc<RwLock<SyncStatus>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StatusMonitor {
    pub fn new(client: SyncClient) -> Self {
        Self {
            client,
            current: Arc::new(RwLock::new(SyncStatus::unknown())),
            task: Mutex::new(None),
        }
    }

    /// One status query; the snapshot is replaced wholesale. A transport
    /// failure replaces it with a synthetic error record instead of
    /// raising.
    pub async fn fetch_now(&self) -> SyncStatus {
        Self::poll_once(&self.client, &self.current).await
    }

    /// Latest status, or the unknown sentinel before the first fetch.
    pub async fn current(&self) -> SyncStatus {
        self.current.read().await.clone()
    }

    /// Drop the last known status back to the unknown sentinel (user
    /// dismissal).
    pub async fn clear(&self) {
        *self.current.write().await = SyncStatus::unknown();
    }

    /// Begin polling every `interval_secs`; the first query runs right
    /// away.
    pub fn start_polling(&self, interval_secs: u64) {
        self.stop_polling();

        let client = self.client.clone();
        let current = Arc::clone(&self.current);
        let handle = tokio::spawn(async move {
            loop {
                Self::poll_once(&client, &current).await;
                tokio::time::sleep(Duration::from_secs(interval_secs)).await;
            }
        });
        *self.task.lock().expect("status task lock poisoned") = Some(handle);
    }

    /// Cancel the poll loop, if running.
    pub fn stop_polling(&self) {
        if let Some(handle) = self.task.lock().expect("status task lock poisoned").take() {
            handle.abort();
        }
    }

    async fn poll_once(client: &SyncClient, current: &RwLock<SyncStatus>) -> SyncStatus {
        let status = match client.status().await {
            Ok(payload) => SyncStatus::from_payload(payload),
            Err(e) => {
                debug!(error = %e, "status fetch failed");
                SyncStatus::unavailable(e.to_string())
            }
        };
        *current.write().await = status.clone();
        status
    }
}

impl Drop for StatusMonitor {
    fn drop(&mut self) {
        self.stop_polling();
    }
}
