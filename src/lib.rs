//! EduSync - Synchronization Session Controller
//!
//! Client-side controller for triggering and monitoring a long-running
//! backend data-synchronization job from an administrative console.
//!
//! # Overview
//!
//! The crate provides:
//! - A state machine ([`session::SyncController`]) that gates a
//!   synchronization attempt on server readiness, enforces a cool-down
//!   between attempts, and reconciles optimistic client state with what the
//!   server actually reports
//! - A cool-down that survives process restarts: the session record is
//!   persisted with its absolute start time and recovered on init
//! - Independent background monitors for readiness and synchronization
//!   status, each of which absorbs its own failures
//!
//! # Module Structure
//!
//! - **`config`** - server URL, cool-down and poll cadences
//! - **`api`** - HTTP client for the remote sync service
//! - **`session`** - persisted session record, countdown timer, controller
//! - **`monitor`** - readiness and status pollers with status normalization
//! - **`notify`** - fire-and-forget notification sink seam
//! - **`error`** - error taxonomy
//!
//! # Usage
//!
//! ```rust,no_run
//! use edusync::config::SyncConfig;
//! use edusync::session::SyncController;
//!
//! # async fn example() -> Result<(), edusync::error::SyncError> {
//! let config = SyncConfig::builder()
//!     .server_url("http://localhost:3000")
//!     .build()
//!     .expect("valid config");
//!
//! let controller = SyncController::builder(config).build();
//! controller.start_monitors();
//!
//! controller.request_sync().await?;
//! // ... observe controller.watch_state() / watch_remaining() ...
//! controller.teardown();
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod monitor;
pub mod notify;
pub mod session;
