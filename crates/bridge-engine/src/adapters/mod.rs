//! # Adapters
//!
//! Concrete realizations of the outbound ports: deterministic in-memory
//! chain clients and recording sinks. Production chain clients plug in
//! through the same ports.

mod in_memory_chain;
mod recording;

pub use in_memory_chain::{ExecutedCall, InMemoryEvmChain, InMemoryL2Chain, SentTransaction};
pub use recording::{RecordingCompletions, RecordingProgress, RecordingTracker};
