//! # Readiness Monitor
//!
//! Tracks whether the remote service can currently accept a synchronization
//! trigger.
//!
//! Failures are policy, not errors: a readiness query that cannot complete
//! reads as `ready = false`. The monitor only ever updates its snapshot;
//! the controller decides what to do with it.

use crate::api::SyncClient;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

/// Latest readiness answer. `checking` stays true until the first result
/// arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessSnapshot {
    pub ready: bool,
    pub checking: bool,
}

impl Default for ReadinessSnapshot {
    fn default() -> Self {
        Self {
            ready: false,
            checking: true,
        }
    }
}

/// Periodic readiness poller.
pub struct ReadinessMonitor {
    client: SyncClient,
    snapshot: Arc<RwLock<ReadinessSnapshot>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ReadinessMonitor {
    pub fn new(client: SyncClient) -> Self {
        Self {
            client,
            snapshot: Arc::new(RwLock::new(ReadinessSnapshot::default())),
            task: Mutex::new(None),
        }
    }

    /// One readiness query, snapshot updated. Any failure reads as not
    /// ready.
    pub async fn check_now(&self) -> bool {
        Self::poll_once(&self.client, &self.snapshot).await
    }

    /// Latest snapshot.
    pub async fn current(&self) -> ReadinessSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Begin polling every `interval_secs`. The first query runs right
    /// away. Cadence is independent of any active cool-down.
    pub fn start_polling(&self, interval_secs: u64) {
        self.stop_polling();

        let client = self.client.clone();
        let snapshot = Arc::clone(&self.snapshot);
        let handle = tokio::spawn(async move {
            loop {
                Self::poll_once(&client, &snapshot).await;
                tokio::time::sleep(Duration::from_secs(interval_secs)).await;
            }
        });
        *self.task.lock().expect("readiness task lock poisoned") = Some(handle);
    }

    /// Cancel the poll loop, if running.
    pub fn stop_polling(&self) {
        if let Some(handle) = self.task.lock().expect("readiness task lock poisoned").take() {
            handle.abort();
        }
    }

    async fn poll_once(client: &SyncClient, snapshot: &RwLock<ReadinessSnapshot>) -> bool {
        snapshot.write().await.checking = true;

        let ready = match client.readiness().await {
            Ok(ready) => ready,
            Err(e) => {
                debug!(error = %e, "readiness check failed, treating as not ready");
                false
            }
        };

        *snapshot.write().await = ReadinessSnapshot {
            ready,
            checking: false,
        };
        ready
    }
}

impl Drop for ReadinessMonitor {
    fn drop(&mut self) {
        self.stop_polling();
    }
}
