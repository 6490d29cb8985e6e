//! # Synchronization Session Management
//!
//! Everything that tracks a synchronization attempt across time:
//!
//! - [`SyncSession`] - the persisted cool-down record
//! - [`SessionStore`] - durable single-record storage, survives restarts
//! - [`CountdownTimer`] - per-second cool-down ticking with recovery
//! - [`SyncController`] - the state machine that orchestrates an attempt
//!
//! The session record is the authoritative account of an in-flight
//! cool-down: the in-memory timer is always rebuilt from it, never the
//! other way around.

pub mod controller;
pub mod countdown;
pub mod store;

pub use controller::{ControllerState, SyncController, SyncControllerBuilder};
pub use countdown::CountdownTimer;
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Persisted record of an in-flight synchronization cool-down.
///
/// Invariant: while `active` is true, `now - started_at` must be below the
/// configured cool-down; once violated the session is expired and gets
/// cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSession {
    pub active: bool,
    /// Wall-clock time the cool-down began, epoch milliseconds.
    pub started_at: i64,
}

impl SyncSession {
    /// A session beginning now.
    pub fn begin(now_ms: i64) -> Self {
        Self {
            active: true,
            started_at: now_ms,
        }
    }
}

/// Wall-clock source, injectable for tests.
pub trait Clock: Send + Sync {
    /// Current time, epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// System wall clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Seconds left of a cool-down that began at `started_at_ms`.
///
/// Derived from absolute time only, so a reload or a machine resuming from
/// sleep recovers the true remaining window instead of a drifted counter.
/// A clock that moved backwards reads as zero elapsed.
pub fn remaining_secs(cooldown_secs: u64, started_at_ms: i64, now_ms: i64) -> u64 {
    let elapsed_secs = (now_ms.saturating_sub(started_at_ms).max(0) / 1000) as u64;
    cooldown_secs.saturating_sub(elapsed_secs)
}
