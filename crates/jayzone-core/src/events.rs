//! Refresh event system.
//!
//! The [`crate::RefreshCoordinator`] publishes an event for every state
//! transition so that a UI layer can redraw without polling.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use jayzone_types::PeriodKind;

use crate::period::DateRange;
use crate::refresh::RequestToken;

/// Events emitted by the refresh coordinator.
///
/// All events are serializable for logging and IPC.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new event types
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum RefreshEvent {
    /// The selected period changed.
    PeriodChanged { from: PeriodKind, to: PeriodKind },
    /// A fetch was started for a new request.
    Started {
        token: RequestToken,
        period: PeriodKind,
        range: DateRange,
    },
    /// The latest request's records were applied.
    Applied {
        token: RequestToken,
        period: PeriodKind,
        sample_count: usize,
        total_seconds: f64,
    },
    /// A superseded request completed and its result was dropped.
    Discarded {
        token: RequestToken,
        current: RequestToken,
    },
    /// The sample source failed; the request continues with no samples.
    FetchFailed { token: RequestToken, error: String },
}

/// Sender for refresh events.
pub type EventSender = broadcast::Sender<RefreshEvent>;

/// Receiver for refresh events.
pub type EventReceiver = broadcast::Receiver<RefreshEvent>;

/// Event dispatcher for sending events to multiple receivers.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    sender: EventSender,
}

impl EventDispatcher {
    /// Create a new event dispatcher.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events.
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Send an event.
    pub fn send(&self, event: RefreshEvent) {
        // Ignore error if no receivers
        let _ = self.sender.send(event);
    }

    /// Get the number of active receivers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(100)
    }
}
