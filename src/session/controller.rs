//! # Sync Session Controller
//!
//! The one component that manages synchronization state across time. It
//! gates a new attempt on a fresh readiness check, persists the cool-down
//! session before the remote trigger goes out, reconciles trigger failures,
//! and re-queries status when a cool-down ends.
//!
//! ## State machine
//!
//! ```text
//! Idle -> CheckingReadiness -> Cooldown -> Idle        (happy path)
//!                           -> Idle                    (not ready)
//! Cooldown -> Failed -> Idle                           (trigger failed)
//! ```
//!
//! The controller is the sole mutator of session state; the monitors only
//! publish snapshots it consults. The persisted session record, not the
//! in-memory timer, is the authority on whether a cool-down is in flight.

use crate::api::SyncClient;
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::monitor::{ReadinessMonitor, StatusMonitor};
use crate::notify::{Level, NotificationSink, TracingSink};
use crate::session::countdown::CountdownTimer;
use crate::session::store::{FileSessionStore, SessionStore};
use crate::session::{remaining_secs, Clock, SyncSession, SystemClock};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Where the controller is in the lifecycle of a synchronization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    CheckingReadiness,
    Cooldown,
    /// Transient: published on a failed trigger, immediately followed by
    /// [`ControllerState::Idle`].
    Failed,
}

/// Orchestrates synchronization attempts. Construct via
/// [`SyncControllerBuilder`]; must be built inside a tokio runtime.
pub struct SyncController {
    client: SyncClient,
    config: SyncConfig,
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn NotificationSink>,
    readiness: ReadinessMonitor,
    status: Arc<StatusMonitor>,
    countdown: Arc<CountdownTimer>,
    state_tx: watch::Sender<ControllerState>,
    expiry_task: Mutex<Option<JoinHandle<()>>>,
}

impl SyncController {
    pub fn builder(config: SyncConfig) -> SyncControllerBuilder {
        SyncControllerBuilder::new(config)
    }

    /// Request a synchronization. Valid only from `Idle`.
    ///
    /// Readiness is checked fresh (never the cached snapshot - this gates
    /// an expensive remote trigger). On a positive answer the session is
    /// persisted and the cool-down starts *before* the trigger call is
    /// issued, so a reload mid-flight always recovers a session already
    /// marked active. The trigger itself runs detached: the returned
    /// future resolves as soon as the cool-down is visible.
    pub async fn request_sync(&self) -> Result<(), SyncError> {
        if *self.state_tx.borrow() != ControllerState::Idle {
            return Err(SyncError::CooldownActive);
        }

        self.set_state(ControllerState::CheckingReadiness);
        if !self.readiness.check_now().await {
            self.sink
                .notify("server not ready for synchronization", Level::Error);
            self.set_state(ControllerState::Idle);
            return Err(SyncError::ReadinessNotMet);
        }

        let session = SyncSession::begin(self.clock.now_ms());
        if let Err(e) = self.store.save(&session) {
            warn!(error = %e, "could not persist session, aborting attempt");
            self.sink.notify(
                "failed to start synchronization: could not persist session",
                Level::Error,
            );
            self.set_state(ControllerState::Failed);
            self.set_state(ControllerState::Idle);
            return Err(e.into());
        }

        self.countdown.start(self.config.cooldown_secs);
        self.set_state(ControllerState::Cooldown);
        info!(cooldown_secs = self.config.cooldown_secs, "cool-down started");

        let client = self.client.clone();
        let store = Arc::clone(&self.store);
        let sink = Arc::clone(&self.sink);
        let countdown = Arc::clone(&self.countdown);
        let status = Arc::clone(&self.status);
        let state_tx = self.state_tx.clone();
        let refetch_delay = self.config.status_refetch_delay_secs;
        let session_started_at = session.started_at;
        tokio::spawn(async move {
            match client.trigger().await {
                Ok(()) => {
                    sink.notify("synchronization started", Level::Success);
                    // Give the backend a moment to begin reporting progress.
                    tokio::time::sleep(Duration::from_secs(refetch_delay)).await;
                    status.fetch_now().await;
                }
                Err(e) => {
                    warn!(error = %e, "trigger failed, rolling back cool-down");
                    // Roll back only this attempt's session: a failure that
                    // resolves after its cool-down already expired (or after
                    // a newer attempt began) must not clear the current one.
                    let still_ours = store
                        .load()
                        .is_some_and(|s| s.started_at == session_started_at);
                    if still_ours {
                        store.clear();
                        countdown.cancel();
                        state_tx.send_replace(ControllerState::Failed);
                        state_tx.send_replace(ControllerState::Idle);
                    }
                    sink.notify(
                        &format!("failed to start synchronization: {}", e.notification_text()),
                        Level::Error,
                    );
                    // Don't leave a stale "in progress" on screen.
                    status.fetch_now().await;
                }
            }
        });

        Ok(())
    }

    /// Current state.
    pub fn state(&self) -> ControllerState {
        *self.state_tx.borrow()
    }

    /// Watch state transitions.
    pub fn watch_state(&self) -> watch::Receiver<ControllerState> {
        self.state_tx.subscribe()
    }

    /// Seconds left of the active cool-down, 0 when idle.
    pub fn remaining_seconds(&self) -> u64 {
        self.countdown.remaining_seconds()
    }

    /// Watch the cool-down tick down.
    pub fn watch_remaining(&self) -> watch::Receiver<u64> {
        self.countdown.subscribe()
    }

    pub fn readiness(&self) -> &ReadinessMonitor {
        &self.readiness
    }

    pub fn status(&self) -> &StatusMonitor {
        &self.status
    }

    /// Start both background pollers at their configured cadences.
    pub fn start_monitors(&self) {
        self.readiness.start_polling(self.config.readiness_poll_secs);
        self.status.start_polling(self.config.status_poll_secs);
    }

    /// Cancel every background task. The persisted session is deliberately
    /// left in place: it is the authoritative record and is honored by
    /// recovery on the next init.
    pub fn teardown(&self) {
        self.readiness.stop_polling();
        self.status.stop_polling();
        self.countdown.cancel();
        if let Some(handle) = self.expiry_task.lock().expect("expiry task lock poisoned").take() {
            handle.abort();
        }
    }

    fn set_state(&self, state: ControllerState) {
        // send_replace stores the value even with no subscribers; state()
        // must read correctly without a watcher.
        self.state_tx.send_replace(state);
    }
}

impl Drop for SyncController {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Builder for [`SyncController`]. Collaborators default to the production
/// implementations (file store, system clock, tracing sink).
pub struct SyncControllerBuilder {
    config: SyncConfig,
    store: Option<Arc<dyn SessionStore>>,
    clock: Option<Arc<dyn Clock>>,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl SyncControllerBuilder {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            store: None,
            clock: None,
            sink: None,
        }
    }

    pub fn store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Build the controller, recovering any persisted cool-down.
    ///
    /// A live session resumes ticking from its absolute start time; an
    /// expired one is cleared and the controller starts `Idle`.
    pub fn build(self) -> SyncController {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(FileSessionStore::default_location()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let sink = self.sink.unwrap_or_else(|| Arc::new(TracingSink));

        let client = SyncClient::new(self.config.clone());
        let readiness = ReadinessMonitor::new(client.clone());
        let status = Arc::new(StatusMonitor::new(client.clone()));

        let (expired_tx, mut expired_rx) = mpsc::unbounded_channel();
        let countdown = Arc::new(CountdownTimer::new(Arc::clone(&store), expired_tx));

        // Session recovery: the persisted absolute start time is the only
        // input; a serialized "seconds left" would drift.
        let initial = match store.load() {
            Some(session) if session.active => {
                let remaining =
                    remaining_secs(self.config.cooldown_secs, session.started_at, clock.now_ms());
                if remaining > 0 {
                    info!(remaining, "recovered in-flight cool-down");
                    countdown.start(remaining);
                    ControllerState::Cooldown
                } else {
                    info!("persisted cool-down already expired, clearing");
                    store.clear();
                    ControllerState::Idle
                }
            }
            Some(_) => {
                store.clear();
                ControllerState::Idle
            }
            None => ControllerState::Idle,
        };
        let (state_tx, _) = watch::channel(initial);

        // Expiry listener: the timer has already cleared the store by the
        // time an event lands here.
        let expiry_state_tx = state_tx.clone();
        let expiry_status = Arc::clone(&status);
        let expiry_task = tokio::spawn(async move {
            while expired_rx.recv().await.is_some() {
                expiry_state_tx.send_replace(ControllerState::Idle);
                // Primary point at which the outcome becomes visible
                // without user action.
                expiry_status.fetch_now().await;
            }
        });

        SyncController {
            client,
            config: self.config,
            store,
            clock,
            sink,
            readiness,
            status,
            countdown,
            state_tx,
            expiry_task: Mutex::new(Some(expiry_task)),
        }
    }
}
