//! Shared helpers for integration tests.

use edusync::notify::{Level, NotificationSink};
use edusync::session::{ControllerState, SyncController};
use std::sync::Mutex;
use std::time::Duration;

/// Sink that records every notification for later assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(String, Level)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, Level)> {
        self.events.lock().unwrap().clone()
    }

    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|(_, l)| *l == level)
            .map(|(m, _)| m)
            .collect()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, message: &str, level: Level) {
        self.events
            .lock()
            .unwrap()
            .push((message.to_string(), level));
    }
}

/// Wait until the controller reaches `target`, panicking after `timeout`.
pub async fn wait_for_state(
    controller: &SyncController,
    target: ControllerState,
    timeout: Duration,
) {
    let mut rx = controller.watch_state();
    let result = tokio::time::timeout(timeout, async {
        loop {
            if *rx.borrow() == target {
                return;
            }
            if rx.changed().await.is_err() {
                panic!("controller state channel closed");
            }
        }
    })
    .await;
    if result.is_err() {
        panic!(
            "controller did not reach {target:?} within {timeout:?} (current: {:?})",
            controller.state()
        );
    }
}
