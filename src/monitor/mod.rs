//! Background monitors for the remote sync service.
//!
//! Both monitors poll independently of the session controller and publish
//! read-only snapshots; neither ever raises - failures fold into the
//! snapshot they own.

pub mod readiness;
pub mod status;

pub use readiness::{ReadinessMonitor, ReadinessSnapshot};
pub use status::{normalize, StatusMonitor, SyncStatus, SyncStatusKind};
