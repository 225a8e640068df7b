//! # Domain Module
//!
//! Errors, step enumerations, tracking events, and invariants.

pub mod errors;
pub mod invariants;
pub mod steps;
pub mod tracking;

pub use errors::{BridgeError, BridgeResult, ChainClientError};
pub use invariants::{invariant_step_advances, StepOrderViolation};
pub use steps::{TransferFlow, TransferStep};
pub use tracking::TrackingEvent;
