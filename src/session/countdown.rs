//! # Cool-down Countdown Timer
//!
//! Ticks a cool-down window down once per second and reports expiry exactly
//! once per start. The persisted session is cleared *before* the expiry
//! event becomes visible, so a reload racing with expiry can never
//! resurrect a dead cool-down.
//!
//! The timer never owns the truth about remaining time: recovery always
//! recomputes it from the persisted absolute start time (see
//! [`remaining_secs`](crate::session::remaining_secs)).

use crate::session::store::SessionStore;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

/// One-second cool-down ticker.
pub struct CountdownTimer {
    store: Arc<dyn SessionStore>,
    remaining_tx: watch::Sender<u64>,
    expired_tx: mpsc::UnboundedSender<()>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CountdownTimer {
    /// Create a timer that clears `store` on expiry and reports expiries on
    /// the returned channel's sender.
    pub fn new(store: Arc<dyn SessionStore>, expired_tx: mpsc::UnboundedSender<()>) -> Self {
        let (remaining_tx, _) = watch::channel(0);
        Self {
            store,
            remaining_tx,
            expired_tx,
            task: Mutex::new(None),
        }
    }

    /// Begin or resume a cool-down of `duration_secs`. A previous countdown,
    /// if any, is aborted; its expiry will not fire.
    pub fn start(&self, duration_secs: u64) {
        self.abort_task();

        if duration_secs == 0 {
            // Already expired at start; behave as if the last tick just ran.
            self.store.clear();
            self.remaining_tx.send_replace(0);
            let _ = self.expired_tx.send(());
            return;
        }

        // send_replace stores the value even with no subscribers;
        // remaining_seconds() must read correctly without a watcher.
        self.remaining_tx.send_replace(duration_secs);

        let store = Arc::clone(&self.store);
        let remaining_tx = self.remaining_tx.clone();
        let expired_tx = self.expired_tx.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // First tick completes immediately; consume it so each later
            // tick marks one elapsed second.
            interval.tick().await;

            let mut left = duration_secs;
            loop {
                interval.tick().await;
                left = left.saturating_sub(1);
                if left == 0 {
                    // Store first, then anything a listener can observe.
                    store.clear();
                    remaining_tx.send_replace(0);
                    let _ = expired_tx.send(());
                    debug!("cool-down expired");
                    break;
                }
                remaining_tx.send_replace(left);
            }
        });
        *self.task.lock().expect("countdown task lock poisoned") = Some(handle);
    }

    /// Seconds left, floored at 0.
    pub fn remaining_seconds(&self) -> u64 {
        *self.remaining_tx.borrow()
    }

    /// Watch the remaining seconds.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.remaining_tx.subscribe()
    }

    /// Abort the in-memory ticking. The persisted session is left alone:
    /// only expiry or an explicit new trigger may clear it.
    pub fn cancel(&self) {
        self.abort_task();
        self.remaining_tx.send_replace(0);
    }

    fn abort_task(&self) {
        if let Some(handle) = self.task.lock().expect("countdown task lock poisoned").take() {
            handle.abort();
        }
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.abort_task();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::MemorySessionStore;
    use crate::session::SyncSession;

    fn timer_with_store() -> (CountdownTimer, Arc<MemorySessionStore>, mpsc::UnboundedReceiver<()>)
    {
        let store = Arc::new(MemorySessionStore::new());
        let (expired_tx, expired_rx) = mpsc::unbounded_channel();
        let store_handle: Arc<dyn SessionStore> = store.clone();
        let timer = CountdownTimer::new(store_handle, expired_tx);
        (timer, store, expired_rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_down_and_expires_once() {
        let (timer, store, mut expired_rx) = timer_with_store();
        store.save(&SyncSession::begin(0)).unwrap();

        timer.start(3);
        assert_eq!(timer.remaining_seconds(), 3);

        // Expiry arrives after three virtual seconds.
        assert!(expired_rx.recv().await.is_some());
        assert_eq!(timer.remaining_seconds(), 0);
        assert!(store.load().is_none());

        // Inert afterwards: no second expiry.
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(expired_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_duration_expires_immediately() {
        let (timer, store, mut expired_rx) = timer_with_store();
        store.save(&SyncSession::begin(0)).unwrap();

        timer.start(0);
        assert!(store.load().is_none());
        assert!(expired_rx.recv().await.is_some());
        assert_eq!(timer.remaining_seconds(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_preserves_persisted_session() {
        let (timer, store, mut expired_rx) = timer_with_store();
        let session = SyncSession::begin(0);
        store.save(&session).unwrap();

        timer.start(30);
        timer.cancel();

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(expired_rx.try_recv().is_err());
        assert_eq!(store.load(), Some(session));
        assert_eq!(timer.remaining_seconds(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_is_monotonically_non_increasing() {
        let (timer, _store, mut expired_rx) = timer_with_store();
        timer.start(4);

        let mut last = timer.remaining_seconds();
        for _ in 0..4 {
            tokio::time::sleep(Duration::from_secs(1)).await;
            let now = timer.remaining_seconds();
            assert!(now <= last);
            last = now;
        }
        assert_eq!(last, 0);
        assert!(expired_rx.recv().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_readable_without_watchers() {
        // No subscribe() call anywhere: ticks must still land in the
        // watch slot for remaining_seconds().
        let (timer, _store, _expired_rx) = timer_with_store();
        timer.start(2);
        assert_eq!(timer.remaining_seconds(), 2);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(timer.remaining_seconds(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_supersedes_previous_countdown() {
        let (timer, _store, mut expired_rx) = timer_with_store();
        timer.start(100);
        timer.start(2);

        assert!(expired_rx.recv().await.is_some());
        // Only the second countdown ever expires.
        tokio::time::sleep(Duration::from_secs(200)).await;
        assert!(expired_rx.try_recv().is_err());
    }
}
