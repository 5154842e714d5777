//! Turning game-written files into state changes.
//!
//! Two kinds of input feed the state: append-only journals, consumed
//! incrementally by [`JournalProcessor`], and whole-file inventory snapshots,
//! applied by [`SnapshotProcessor`].

mod handlers;
mod journal;
mod records;
mod snapshot;

pub use journal::{JournalOutcome, JournalProcessor};
pub use snapshot::{SnapshotOutcome, SnapshotProcessor};
