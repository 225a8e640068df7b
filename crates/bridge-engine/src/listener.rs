//! # Event Listener Registry
//!
//! Single-slot subscription to chain-emitted bridge events. Each
//! orchestrator flow owns one slot; a registration is satisfied exactly
//! once (one event delivery) or never (cleared, or the process ends).
//!
//! Registering while a listener is active is a programming error and fails
//! fast instead of silently replacing the previous subscription. The
//! external event pump that watches the chain calls [`deliver`] with
//! matching events.
//!
//! [`deliver`]: EventListenerRegistry::deliver

use crate::domain::{BridgeError, BridgeResult};
use parking_lot::Mutex;
use tokio::sync::oneshot;

/// One-slot, one-shot event subscription.
pub struct EventListenerRegistry<E> {
    slot: Mutex<Option<oneshot::Sender<E>>>,
}

impl<E: Send> EventListenerRegistry<E> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Register a listener, receiving the next delivered event.
    ///
    /// Fails with [`BridgeError::ListenerActive`] while a live listener
    /// occupies the slot. A slot whose receiver was dropped counts as free.
    pub fn register(&self) -> BridgeResult<oneshot::Receiver<E>> {
        let mut slot = self.slot.lock();
        if slot.as_ref().is_some_and(|sender| !sender.is_closed()) {
            return Err(BridgeError::ListenerActive);
        }
        let (sender, receiver) = oneshot::channel();
        *slot = Some(sender);
        Ok(receiver)
    }

    /// Deliver an event to the active listener, consuming the slot.
    ///
    /// Returns whether a listener consumed the event. At most one delivery
    /// succeeds per registration.
    pub fn deliver(&self, event: E) -> bool {
        let sender = self.slot.lock().take();
        match sender {
            Some(sender) => sender.send(event).is_ok(),
            None => false,
        }
    }

    /// Clear the slot, cancelling any pending wait. Idempotent.
    ///
    /// The waiting side observes a clean cancellation, not an event.
    pub fn clear(&self) {
        self.slot.lock().take();
    }

    /// Whether a live listener currently occupies the slot.
    pub fn is_active(&self) -> bool {
        self.slot
            .lock()
            .as_ref()
            .is_some_and(|sender| !sender.is_closed())
    }
}

impl<E: Send> Default for EventListenerRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}
