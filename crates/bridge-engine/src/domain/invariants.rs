//! # Domain Invariants
//!
//! Checkable invariants enforced at runtime seams.

use thiserror::Error;

/// Violation of the step-ordering invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("progress step {next} does not advance past {prev}")]
pub struct StepOrderViolation {
    /// Previously reported step index.
    pub prev: usize,
    /// Step index that failed to advance.
    pub next: usize,
}

/// Within one orchestrator run, reported step indices must be strictly
/// increasing: each index reported at most once, none revisited.
pub fn invariant_step_advances(
    prev: Option<usize>,
    next: usize,
) -> Result<(), StepOrderViolation> {
    match prev {
        Some(prev) if next <= prev => Err(StepOrderViolation { prev, next }),
        _ => Ok(()),
    }
}
