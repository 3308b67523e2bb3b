//! Store event channel for sync triggering.
//!
//! Mutations that leave an entry waiting for upload emit an event instead of
//! calling into the reconciler directly. The reconciler subscribes and
//! decides when to sweep; the store never blocks on a consumer, and a
//! missing or lagging receiver never fails a mutation.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events emitted by the store.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new event types
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum StoreEvent {
    /// An entry entered the `pending` state and is waiting for a sweep.
    EntryPending { id: String },
}

/// Sender for store events.
pub type EventSender = broadcast::Sender<StoreEvent>;

/// Receiver for store events.
pub type EventReceiver = broadcast::Receiver<StoreEvent>;

/// Create a new event channel with the given capacity.
pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    broadcast::channel(capacity)
}

/// Create a default event channel with capacity 64.
pub fn default_event_channel() -> (EventSender, EventReceiver) {
    event_channel(64)
}
