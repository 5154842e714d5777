//! In-process change notifications.

use tokio::sync::broadcast;
use tracing::trace;

use crate::models::{Commander, StoragePool};

const CHANNEL_CAPACITY: usize = 256;

/// Notifications published when state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    /// Watchers are running and the initial replay is done.
    ApplicationStarted,
    /// One or more engineer states changed.
    EngineersChanged,
    /// A commander's wishlist was written.
    WishlistChanged {
        /// Commander whose list changed.
        fid: String,
        /// Entries on the list afterwards.
        size: usize,
    },
    /// A commander was seen for the first time this session.
    CommanderAdded(Commander),
    /// Quantities in a storage pool changed.
    StorageChanged(StoragePool),
}

/// Broadcast channel for [`StateEvent`]s.
///
/// Delivery is best-effort: events published without subscribers are
/// dropped, and a subscriber that falls more than the channel capacity
/// behind loses the oldest events.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<StateEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Bus with the default capacity.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Register a new subscriber; it sees events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: StateEvent) {
        trace!(?event, "publishing state event");
        let _ = self.sender.send(event);
    }
}
