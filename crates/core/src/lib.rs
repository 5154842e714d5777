#![warn(clippy::all, missing_docs)]

//! Core of the Odyssey materials tracker.
//!
//! This crate keeps the in-memory picture of a commander's on-foot
//! inventory, engineers and wishlists, and keeps it in step with the files
//! the game writes: append-only journals and whole-file inventory snapshots.
//! Frontends construct a [`SharedState`], register the processors with a
//! [`FileChangeWatcher`] and subscribe to [`StateEvent`]s.

pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod preferences;
pub mod processor;
pub mod state;
pub mod watcher;

pub use config::AppConfig;
pub use error::{ProcessError, RecipeError};
pub use events::{EventBus, StateEvent};
pub use preferences::{FilePreferences, MemoryPreferences, PreferenceStore};
pub use processor::{JournalOutcome, JournalProcessor, SnapshotOutcome, SnapshotProcessor};
pub use state::{ApplicationState, SharedState};
pub use watcher::{FileChangeWatcher, WatcherHandle, WatcherSettings};
