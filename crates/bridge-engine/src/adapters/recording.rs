//! # Recording Sinks
//!
//! Sink adapters that retain everything they receive. Tests assert against
//! the recorded sequences; a local run can dump them for inspection.

use crate::domain::TrackingEvent;
use crate::ports::outbound::{CompletionSink, ProgressSink, Tracker};
use crate::progress::ProgressUpdate;
use bridge_types::Transfer;
use parking_lot::Mutex;
use tracing::debug;

/// [`Tracker`] that records every analytics event in order.
#[derive(Default)]
pub struct RecordingTracker {
    events: Mutex<Vec<TrackingEvent>>,
}

impl RecordingTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything tracked so far, in order.
    pub fn events(&self) -> Vec<TrackingEvent> {
        self.events.lock().clone()
    }

    /// Stable names of everything tracked so far, in order.
    pub fn event_names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|e| e.name()).collect()
    }
}

impl Tracker for RecordingTracker {
    fn track(&self, event: TrackingEvent) {
        debug!(event = event.name(), "tracking event");
        self.events.lock().push(event);
    }
}

/// [`ProgressSink`] that records every update in order.
#[derive(Default)]
pub struct RecordingProgress {
    updates: Mutex<Vec<ProgressUpdate>>,
}

impl RecordingProgress {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every update received so far, in order.
    pub fn updates(&self) -> Vec<ProgressUpdate> {
        self.updates.lock().clone()
    }

    /// The `active_step` sequence received so far.
    pub fn steps(&self) -> Vec<usize> {
        self.updates.lock().iter().map(|u| u.active_step).collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn progress(&self, update: ProgressUpdate) {
        self.updates.lock().push(update);
    }
}

/// [`CompletionSink`] that records every finished transfer in order.
#[derive(Default)]
pub struct RecordingCompletions {
    transfers: Mutex<Vec<Transfer>>,
}

impl RecordingCompletions {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every transfer received so far, in order.
    pub fn transfers(&self) -> Vec<Transfer> {
        self.transfers.lock().clone()
    }
}

impl CompletionSink for RecordingCompletions {
    fn transfer_completed(&self, transfer: Transfer) {
        self.transfers.lock().push(transfer);
    }
}
