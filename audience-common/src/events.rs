//! Event types for user-list state changes
//!
//! Provides the ListEvent enum and an EventBus so UI layers can react to
//! pages arriving, load failures and resets without polling list state.

use crate::models::Id;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// User-list events
///
/// Events are broadcast via EventBus and can be serialized for transmission
/// to a UI process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ListEvent {
    /// A page was merged into a list
    PageLoaded {
        /// List tag (e.g. "followers", "track_reposts")
        list: String,
        /// Entity the list is about
        entity_id: Id,
        /// Page that was loaded (0-based)
        page: u32,
        /// Number of user ids now in the list
        total: usize,
        /// Whether another page can be requested
        has_more: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Loading a page failed; the list keeps its previous contents
    LoadFailed {
        list: String,
        entity_id: Id,
        page: u32,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// List state was cleared
    Reset {
        list: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl ListEvent {
    /// List tag carried by every event
    pub fn list(&self) -> &str {
        match self {
            ListEvent::PageLoaded { list, .. }
            | ListEvent::LoadFailed { list, .. }
            | ListEvent::Reset { list, .. } => list,
        }
    }
}

/// Broadcast bus for ListEvent
pub struct EventBus {
    tx: broadcast::Sender<ListEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// * `capacity` - Number of events to buffer before slow receivers lag
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<ListEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: ListEvent) {
        let _ = self.tx.send(event);
    }
}
