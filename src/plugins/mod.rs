//! Plugins shipped with the crate.
//!
//! - [`SnapshotPlugin`]: attribute history, dirty tracking and rollback
//!
//! Custom plugins implement [`Plugin`](crate::rest::Plugin).

mod snapshot;

pub use snapshot::{SnapshotExt, SnapshotPlugin, SNAPSHOTS};
